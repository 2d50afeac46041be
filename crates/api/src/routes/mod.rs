pub mod automations;
pub mod field_types;
pub mod forms;
pub mod health;
pub mod public;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /field-types                          palette + property schemas (GET)
///
/// /forms                                create (POST), list by organization (GET)
/// /forms/{id}                           get (GET)
/// /forms/{id}/content                   explicit save (PUT)
/// /forms/{id}/publish                   publish (POST)
/// /forms/{id}/submissions               list (GET)
/// /forms/{id}/designer                  open (POST), snapshot (GET), close (DELETE)
/// /forms/{id}/designer/events           apply designer event (POST)
/// /forms/{id}/automations               list, create (GET, POST)
///
/// /automations/{id}                     delete (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/field-types", field_types::router())
        .nest("/forms", forms::router())
        .nest("/automations", automations::router())
}
