#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use formkit_core::roles::Role;
use formkit_core::types::DbId;
use formkit_db::MemoryFormStore;
use formkit_events::{ChannelNotifier, EventBus, WebhookDelivery};
use formkit_pipeline::AutosaveConfig;
use http_body_util::BodyExt;
use tower::ServiceExt;

use formkit_api::auth::jwt::{issue_token, JwtConfig};
use formkit_api::config::ServerConfig;
use formkit_api::router::build_app_router;
use formkit_api::state::AppState;

pub const ORG: DbId = 1;
pub const OWNER: DbId = 10;
pub const EDITOR: DbId = 11;
pub const VIEWER: DbId = 12;
pub const OUTSIDER: DbId = 99;

/// Debounce used by the tests; short so they run in real time.
pub const TEST_IDLE: Duration = Duration::from_millis(100);

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            issuer: None,
            token_ttl_mins: 15,
        },
        autosave: AutosaveConfig {
            idle_delay: TEST_IDLE,
            max_wait: None,
        },
    }
}

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub store: Arc<MemoryFormStore>,
    pub bus: Arc<EventBus>,
}

/// The full router on the in-memory store, with one organization holding an
/// owner, an editor and a viewer.
pub async fn build_test_app() -> TestApp {
    let store = Arc::new(MemoryFormStore::new());
    store.add_member(ORG, OWNER, Role::Owner).await;
    store.add_member(ORG, EDITOR, Role::Editor).await;
    store.add_member(ORG, VIEWER, Role::Viewer).await;

    let bus = Arc::new(EventBus::default());
    let notifier = Arc::new(ChannelNotifier::new(
        None,
        WebhookDelivery::new().with_retry_delays(Vec::new()),
        Arc::clone(&bus),
    ));
    let state = AppState::new(
        store.clone(),
        store.clone(),
        notifier,
        None,
        test_config(),
        Arc::clone(&bus),
    );

    TestApp {
        app: build_app_router(state.clone()),
        state,
        store,
        bus,
    }
}

pub fn token(user_id: DbId) -> String {
    issue_token(user_id, &test_config().jwt).expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<DbId>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user {
        builder = builder.header("authorization", format!("Bearer {}", token(user_id)));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: &Router, uri: &str, user: DbId) -> Response<Body> {
    send(app, Method::GET, uri, Some(user), None).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: &Router,
    uri: &str,
    user: DbId,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(user), Some(body)).await
}

pub async fn post_auth(app: &Router, uri: &str, user: DbId) -> Response<Body> {
    send(app, Method::POST, uri, Some(user), None).await
}

pub async fn put_json_auth(
    app: &Router,
    uri: &str,
    user: DbId,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(user), Some(body)).await
}

pub async fn delete_auth(app: &Router, uri: &str, user: DbId) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(user), None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a form as the owner and return its id.
pub async fn create_form(app: &Router, title: &str) -> DbId {
    let response = post_json_auth(
        app,
        "/api/v1/forms",
        OWNER,
        serde_json::json!({ "organization_id": ORG, "title": title }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Create a form whose content is `elements`, optionally publishing it.
pub async fn form_with(app: &Router, elements: serde_json::Value, publish: bool) -> DbId {
    let id = create_form(app, "Fixture").await;
    let response = put_json_auth(
        app,
        &format!("/api/v1/forms/{id}/content"),
        OWNER,
        serde_json::json!({ "content": elements }),
    )
    .await;
    assert_eq!(response.status(), 200);
    if publish {
        let response = post_auth(app, &format!("/api/v1/forms/{id}/publish"), OWNER).await;
        assert_eq!(response.status(), 200);
    }
    id
}

/// `[f1 Text required, f2 Checkbox optional]`
pub fn name_and_consent() -> serde_json::Value {
    serde_json::json!([
        {
            "id": "f1",
            "type": "TextField",
            "extraAttributes": {
                "label": "Name",
                "helperText": "Your full name",
                "required": true,
                "placeholder": "Jane Doe"
            }
        },
        {
            "id": "f2",
            "type": "CheckboxField",
            "extraAttributes": {
                "label": "Consent",
                "helperText": "Tick to agree",
                "required": false
            }
        }
    ])
}
