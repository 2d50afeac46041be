//! Anonymous fill surface, mounted at `/public` (outside `/api/v1`).

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::public;
use crate::state::AppState;

/// ```text
/// GET  /forms/{id}              -> get_fill_form
/// POST /forms/{id}/submissions  -> submit
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/forms/{id}", get(public::get_fill_form))
        .route("/forms/{id}/submissions", post(public::submit))
}
