//! Handlers for live designer sessions.
//!
//! A session is opened over the stored content, receives designer events one
//! at a time and auto-saves after mutations. Opening a form that already has
//! a session replaces it.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use formkit_core::designer::{DesignerEvent, EventOutcome};
use formkit_core::error::CoreError;
use formkit_core::roles::Permission;
use formkit_core::types::DbId;
use formkit_pipeline::session::SharedSession;
use formkit_pipeline::SessionSnapshot;
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::authorize_form;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub outcome: EventOutcome,
    pub session: SessionSnapshot,
}

async fn open_session_for(state: &AppState, form_id: DbId) -> AppResult<SharedSession> {
    state
        .sessions
        .get(form_id)
        .await
        .ok_or_else(|| CoreError::not_found("designer session", form_id).into())
}

/// POST /api/v1/forms/{id}/designer
///
/// Hydrate a session from the stored tree. Nothing is saved until the first
/// mutation.
pub async fn open_session(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let form = authorize_form(&state, &user, id, Permission::Edit).await?;
    let session = state.sessions.open(&form, user.user_id).await;
    let snapshot = session.lock().await.snapshot();

    tracing::info!(
        form_id = id,
        user_id = user.user_id,
        elements = form.content.len(),
        "Designer session opened"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: snapshot })))
}

/// GET /api/v1/forms/{id}/designer
pub async fn get_session(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    authorize_form(&state, &user, id, Permission::Edit).await?;
    let session = open_session_for(&state, id).await?;
    let snapshot = session.lock().await.snapshot();
    Ok(Json(DataResponse { data: snapshot }))
}

/// DELETE /api/v1/forms/{id}/designer
///
/// Tears the session down; an auto-save still waiting for its debounce
/// window is discarded.
pub async fn close_session(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    authorize_form(&state, &user, id, Permission::Edit).await?;
    if !state.sessions.close(id).await {
        return Err(CoreError::not_found("designer session", id).into());
    }
    tracing::info!(form_id = id, user_id = user.user_id, "Designer session closed");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/forms/{id}/designer/events
pub async fn apply_event(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(event): AppJson<DesignerEvent>,
) -> AppResult<impl IntoResponse> {
    authorize_form(&state, &user, id, Permission::Edit).await?;
    let session = open_session_for(&state, id).await?;

    let mut session = session.lock().await;
    let outcome = session.apply(event)?;
    let snapshot = session.snapshot();

    Ok(Json(DataResponse {
        data: EventResponse {
            outcome,
            session: snapshot,
        },
    }))
}
