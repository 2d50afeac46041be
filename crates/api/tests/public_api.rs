//! HTTP-level tests for the anonymous fill surface, the submission pipeline
//! and automation rules.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{
    body_json, create_form, delete_auth, form_with, get, get_auth, name_and_consent,
    post_json, post_json_auth, EDITOR, OWNER, VIEWER,
};
use formkit_core::form::{LifecycleKind, STATUS_COMPLETED, STATUS_DONE};
use formkit_events::bus::{
    EVENT_LIFECYCLE_FAILED, EVENT_NOTIFICATION, EVENT_RULE_FIRED, EVENT_SUBMISSION_CREATED,
};
use serde_json::json;

fn submit_uri(id: i64) -> String {
    format!("/public/forms/{id}/submissions")
}

// ---------------------------------------------------------------------------
// Fill mode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn draft_forms_are_invisible() {
    let t = common::build_test_app().await;
    let id = form_with(&t.app, name_and_consent(), false).await;

    let response = get(&t.app, &format!("/public/forms/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json(&t.app, &submit_uri(id), json!({ "f1": "Alice" })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(t.store.submission_count().await, 0);
}

#[tokio::test]
async fn missing_form_is_not_found() {
    let t = common::build_test_app().await;
    let response = get(&t.app, "/public/forms/777").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn published_form_renders_fill_views() {
    let t = common::build_test_app().await;
    let id = form_with(&t.app, name_and_consent(), true).await;

    let response = get(&t.app, &format!("/public/forms/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let fields = json["data"]["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(json["data"]["form_id"], id);
    assert_eq!(json["data"]["title"], "Fixture");
}

// ---------------------------------------------------------------------------
// Submission pipeline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn required_field_scenario() {
    let t = common::build_test_app().await;
    let id = form_with(&t.app, name_and_consent(), true).await;

    let response = post_json(&t.app, &submit_uri(id), json!({ "f1": "" })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "FIELD_VALIDATION");
    let failing: Vec<&str> = json["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field_id"].as_str().unwrap())
        .collect();
    assert_eq!(failing, vec!["f1"]);
    assert_eq!(t.store.submission_count().await, 0);

    let mut events = t.bus.subscribe();
    let response = post_json(&t.app, &submit_uri(id), json!({ "f1": "Alice" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["data"], json!({ "f1": "Alice" }));
    assert_eq!(t.store.submission_count().await, 1);
    assert_eq!(events.recv().await.unwrap().event_type, EVENT_SUBMISSION_CREATED);

    let response = get_auth(&t.app, &format!("/api/v1/forms/{id}/submissions"), VIEWER).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn linkage_completes_task_and_visit() {
    let t = common::build_test_app().await;
    t.store.seed_lifecycle(LifecycleKind::Task, 5, "open").await;
    t.store.seed_lifecycle(LifecycleKind::Assignment, 6, "open").await;
    t.store.seed_lifecycle(LifecycleKind::Visit, 7, "scheduled").await;
    let id = form_with(&t.app, name_and_consent(), true).await;

    let response = post_json(
        &t.app,
        &submit_uri(id),
        json!({ "f1": "Alice", "taskId": "5", "assignmentId": "6", "visitId": "7" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let task = t.store.lifecycle(LifecycleKind::Task, 5).await.unwrap();
    assert_eq!(task.status, STATUS_DONE);
    let assignment = t.store.lifecycle(LifecycleKind::Assignment, 6).await.unwrap();
    assert_eq!(assignment.status, "open");
    let visit = t.store.lifecycle(LifecycleKind::Visit, 7).await.unwrap();
    assert_eq!(visit.status, STATUS_COMPLETED);
}

#[tokio::test]
async fn malformed_linkage_is_a_bad_request() {
    let t = common::build_test_app().await;
    let id = form_with(&t.app, name_and_consent(), true).await;

    let response = post_json(
        &t.app,
        &submit_uri(id),
        json!({ "f1": "Alice", "visitId": "-3" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(t.store.submission_count().await, 0);
}

#[tokio::test]
async fn undecodable_body_gets_error_envelope() {
    let t = common::build_test_app().await;
    let id = form_with(&t.app, name_and_consent(), true).await;

    let response = post_json(&t.app, &submit_uri(id), json!({ "f1": true })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));
    assert_eq!(t.store.submission_count().await, 0);
}

#[tokio::test]
async fn unknown_linked_task_still_completes_visit_and_runs_rules() {
    let t = common::build_test_app().await;
    t.store.seed_lifecycle(LifecycleKind::Visit, 4, "scheduled").await;
    let id = form_with(&t.app, name_and_consent(), true).await;
    let response = post_json_auth(
        &t.app,
        &format!("/api/v1/forms/{id}/automations"),
        OWNER,
        json!({ "name": "Every submission", "recipient": "dispatch-team" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let mut events = t.bus.subscribe();
    let response = post_json(
        &t.app,
        &submit_uri(id),
        json!({ "f1": "x", "taskId": "999", "visitId": "4" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["task_id"], 999);
    assert_eq!(t.store.submission_count().await, 1);

    let visit = t.store.lifecycle(LifecycleKind::Visit, 4).await.unwrap();
    assert_eq!(visit.status, STATUS_COMPLETED);

    assert!(t.state.pipeline.drain(Duration::from_secs(5)).await);
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event.event_type);
    }
    assert_eq!(
        seen.iter().filter(|e| e.as_str() == EVENT_LIFECYCLE_FAILED).count(),
        1
    );
    assert!(seen.iter().any(|e| e == EVENT_SUBMISSION_CREATED));
    assert_eq!(
        seen.iter().filter(|e| e.as_str() == EVENT_NOTIFICATION).count(),
        1
    );
}

// ---------------------------------------------------------------------------
// Automation
// ---------------------------------------------------------------------------

fn urgent_rule(recipient: &str) -> serde_json::Value {
    json!({
        "name": "Escalate urgent",
        "conditions": [{ "field_id": "f1", "operator": "equals", "value": "urgent" }],
        "recipient": recipient
    })
}

#[tokio::test]
async fn rule_must_reference_existing_fields() {
    let t = common::build_test_app().await;
    let id = create_form(&t.app, "Empty").await;

    let response = post_json_auth(
        &t.app,
        &format!("/api/v1/forms/{id}/automations"),
        EDITOR,
        urgent_rule("dispatch-team"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn urgent_rule_fires_once_and_notifies_in_app() {
    let t = common::build_test_app().await;
    let id = form_with(&t.app, name_and_consent(), true).await;

    let response = post_json_auth(
        &t.app,
        &format!("/api/v1/forms/{id}/automations"),
        EDITOR,
        urgent_rule("dispatch-team"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let rule = body_json(response).await;
    assert_eq!(rule["data"]["actions"][0]["type"], "send_notification");
    assert_eq!(rule["data"]["actions"][0]["target"], "dispatch-team");

    let mut events = t.bus.subscribe();
    post_json(&t.app, &submit_uri(id), json!({ "f1": "urgent" })).await;
    post_json(&t.app, &submit_uri(id), json!({ "f1": "normal" })).await;
    assert!(t.state.pipeline.drain(Duration::from_secs(5)).await);

    let mut fired = 0;
    let mut notified = 0;
    while let Ok(event) = events.try_recv() {
        match event.event_type.as_str() {
            EVENT_RULE_FIRED => fired += 1,
            EVENT_NOTIFICATION => {
                notified += 1;
                assert_eq!(event.payload["recipient"], "dispatch-team");
            }
            _ => {}
        }
    }
    assert_eq!(fired, 1);
    assert_eq!(notified, 1);
}

#[tokio::test]
async fn undeliverable_action_still_accepts_submission() {
    let t = common::build_test_app().await;
    let id = form_with(&t.app, name_and_consent(), true).await;
    // Email is not configured in tests, so this action always fails.
    post_json_auth(
        &t.app,
        &format!("/api/v1/forms/{id}/automations"),
        OWNER,
        urgent_rule("ops@example.com"),
    )
    .await;

    let response = post_json(&t.app, &submit_uri(id), json!({ "f1": "urgent" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(t.state.pipeline.drain(Duration::from_secs(5)).await);
    assert_eq!(t.store.submission_count().await, 1);
}

#[tokio::test]
async fn rules_can_be_listed_and_deleted() {
    let t = common::build_test_app().await;
    let id = form_with(&t.app, name_and_consent(), false).await;
    let response = post_json_auth(
        &t.app,
        &format!("/api/v1/forms/{id}/automations"),
        OWNER,
        urgent_rule("dispatch-team"),
    )
    .await;
    let rule_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = get_auth(&t.app, &format!("/api/v1/forms/{id}/automations"), VIEWER).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    let response = delete_auth(&t.app, &format!("/api/v1/automations/{rule_id}"), VIEWER).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(&t.app, &format!("/api/v1/automations/{rule_id}"), OWNER).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(&t.app, &format!("/api/v1/forms/{id}/automations"), VIEWER).await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());
}
