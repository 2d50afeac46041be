use axum::routing::delete;
use axum::Router;

use crate::handlers::automations;
use crate::state::AppState;

/// Mounted at `/automations`.
///
/// ```text
/// DELETE /{id} -> delete_rule
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", delete(automations::delete_rule))
}
