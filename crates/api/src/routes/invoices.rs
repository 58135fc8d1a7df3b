//! Route definitions for a host's own invoices.

use axum::routing::get;
use axum::Router;

use crate::handlers::invoices;
use crate::state::AppState;

/// Routes mounted at `/invoices`.
///
/// ```text
/// GET / -> list_my_invoices
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(invoices::list_my_invoices))
}
