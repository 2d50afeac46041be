//! Route definitions for the field type catalog.

use axum::routing::get;
use axum::Router;

use crate::handlers::field_types;
use crate::state::AppState;

/// Mounted at `/field-types`.
///
/// ```text
/// GET / -> list_field_types
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(field_types::list_field_types))
}
