//! Route definitions for public workflow lookups.

use axum::routing::get;
use axum::Router;

use crate::handlers::workflows;
use crate::state::AppState;

/// Routes mounted at `/workflows`.
///
/// ```text
/// GET /by-type/{type}  -> get_default_workflow
/// GET /{id}/next       -> next_steps (?from=<node_id>)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/by-type/{type}", get(workflows::get_default_workflow))
        .route("/{id}/next", get(workflows::next_steps))
}
