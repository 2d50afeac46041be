//! Handlers for form management: create, list, read, explicit save,
//! publish and submission listing.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use formkit_core::designer::ElementTree;
use formkit_core::fields::FieldInstance;
use formkit_core::form::NewForm;
use formkit_core::roles::Permission;
use formkit_core::types::DbId;
use formkit_events::bus::EVENT_FORM_PUBLISHED;
use formkit_events::FormEvent;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::{AppJson, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{authorize_form, authorize_org};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListFormsQuery {
    pub organization_id: DbId,
}

/// Full replacement content for an explicit save.
#[derive(Debug, Deserialize)]
pub struct SaveContentRequest {
    pub content: Vec<FieldInstance>,
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

/// POST /api/v1/forms
pub async fn create_form(
    user: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<NewForm>,
) -> AppResult<impl IntoResponse> {
    input.check()?;
    authorize_org(&state, &user, input.organization_id, Permission::Edit).await?;

    let form = state.store.create_form(&input).await?;
    tracing::info!(
        form_id = form.id,
        organization_id = form.organization_id,
        user_id = user.user_id,
        "Form created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: form })))
}

/// GET /api/v1/forms?organization_id=
pub async fn list_forms(
    user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListFormsQuery>,
) -> AppResult<impl IntoResponse> {
    authorize_org(&state, &user, query.organization_id, Permission::Read).await?;
    let forms = state.store.list_forms(query.organization_id).await?;
    Ok(Json(DataResponse { data: forms }))
}

/// GET /api/v1/forms/{id}
pub async fn get_form(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let form = authorize_form(&state, &user, id, Permission::Read).await?;
    Ok(Json(DataResponse { data: form }))
}

/// PUT /api/v1/forms/{id}/content
///
/// Writes the whole tree. Runs independently of any designer session's
/// auto-save; the later write wins.
pub async fn save_content(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<SaveContentRequest>,
) -> AppResult<impl IntoResponse> {
    authorize_form(&state, &user, id, Permission::Edit).await?;
    let tree = ElementTree::from_elements(input.content)?;

    let form = state.store.update_form_content(id, &tree).await?;
    tracing::info!(
        form_id = id,
        user_id = user.user_id,
        elements = tree.len(),
        "Form content saved"
    );

    Ok(Json(DataResponse { data: form }))
}

/// POST /api/v1/forms/{id}/publish
///
/// Idempotent; `form.published` is only emitted on the first publish.
pub async fn publish_form(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let before = authorize_form(&state, &user, id, Permission::Publish).await?;
    let form = state.store.publish_form(id).await?;

    if !before.is_published {
        tracing::info!(form_id = id, user_id = user.user_id, "Form published");
        state.event_bus.publish(
            FormEvent::new(EVENT_FORM_PUBLISHED)
                .with_form(id)
                .with_actor(user.user_id),
        );
    }

    Ok(Json(DataResponse { data: form }))
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

/// GET /api/v1/forms/{id}/submissions
pub async fn list_submissions(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    authorize_form(&state, &user, id, Permission::Read).await?;
    let submissions = state.store.list_submissions(id).await?;
    Ok(Json(DataResponse { data: submissions }))
}
