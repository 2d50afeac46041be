//! Handlers for automation rule authoring.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use formkit_core::automation::NewAutomationRule;
use formkit_core::roles::Permission;
use formkit_core::types::DbId;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::authorize_form;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/forms/{id}/automations
pub async fn list_rules(
    user: AuthUser,
    State(state): State<AppState>,
    Path(form_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    authorize_form(&state, &user, form_id, Permission::Read).await?;
    let rules = state.store.list_rules(form_id).await?;
    Ok(Json(DataResponse { data: rules }))
}

/// POST /api/v1/forms/{id}/automations
///
/// Conditions must reference fields present in the form's current tree. The
/// rule gets exactly one notification action addressed to `recipient`.
pub async fn create_rule(
    user: AuthUser,
    State(state): State<AppState>,
    Path(form_id): Path<DbId>,
    AppJson(input): AppJson<NewAutomationRule>,
) -> AppResult<impl IntoResponse> {
    let form = authorize_form(&state, &user, form_id, Permission::Edit).await?;
    let (conditions, actions) = input.check(&form.content)?;

    let rule = state
        .store
        .create_rule(form_id, input.name.trim(), &conditions, &actions)
        .await?;
    tracing::info!(
        rule_id = rule.id,
        form_id,
        conditions = rule.conditions.len(),
        user_id = user.user_id,
        "Automation rule created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: rule })))
}

/// DELETE /api/v1/automations/{id}
pub async fn delete_rule(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let rule = state.store.get_rule(id).await?;
    authorize_form(&state, &user, rule.form_id, Permission::Edit).await?;

    state.store.delete_rule(id).await?;
    tracing::info!(rule_id = id, form_id = rule.form_id, user_id = user.user_id, "Automation rule deleted");

    Ok(StatusCode::NO_CONTENT)
}
