//! Anonymous fill surface.
//!
//! Only published forms are visible here; drafts answer exactly like missing
//! forms.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use formkit_core::fill::{render_fill, FillForm, SubmissionValues};
use formkit_core::types::DbId;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /public/forms/{id}
pub async fn get_fill_form(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let form = state.store.get_form(id).await?;
    form.ensure_published()?;

    Ok(Json(DataResponse {
        data: FillForm {
            form_id: form.id,
            fields: render_fill(&form.content),
            title: form.title,
            description: form.description,
        },
    }))
}

/// POST /public/forms/{id}/submissions
///
/// Body is the flat `field id -> value` mapping, optionally carrying
/// `taskId`, `assignmentId` and `visitId`.
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(values): AppJson<SubmissionValues>,
) -> AppResult<impl IntoResponse> {
    let submission = state.pipeline.submit(id, values).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: submission })))
}
