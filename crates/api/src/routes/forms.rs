//! Route definitions for form management, the designer and automation
//! authoring.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{automations, designer, forms};
use crate::state::AppState;

/// Mounted at `/forms`.
///
/// ```text
/// POST   /                       -> create_form
/// GET    /?organization_id=      -> list_forms
/// GET    /{id}                   -> get_form
/// PUT    /{id}/content           -> save_content
/// POST   /{id}/publish           -> publish_form
/// GET    /{id}/submissions       -> list_submissions
/// POST   /{id}/designer          -> open_session
/// GET    /{id}/designer          -> get_session
/// DELETE /{id}/designer          -> close_session
/// POST   /{id}/designer/events   -> apply_event
/// GET    /{id}/automations       -> list_rules
/// POST   /{id}/automations       -> create_rule
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(forms::create_form).get(forms::list_forms))
        .route("/{id}", get(forms::get_form))
        .route("/{id}/content", put(forms::save_content))
        .route("/{id}/publish", post(forms::publish_form))
        .route("/{id}/submissions", get(forms::list_submissions))
        .route(
            "/{id}/designer",
            post(designer::open_session)
                .get(designer::get_session)
                .delete(designer::close_session),
        )
        .route("/{id}/designer/events", post(designer::apply_event))
        .route(
            "/{id}/automations",
            get(automations::list_rules).post(automations::create_rule),
        )
}
