//! Route definitions for the drawbot and spinner queues.
//!
//! Each router is built once per [`BoothKind`]; the kind reaches the shared
//! handlers as a request extension.

use axum::routing::{get, post, put};
use axum::{Extension, Router};
use gaestefotos_core::booth::BoothKind;

use crate::handlers::booth;
use crate::state::AppState;

/// Event-scoped queue routes, mounted at `/events/{id}/{kind}`.
///
/// ```text
/// POST /                  -> enqueue_job (public, rate limited)
/// GET  /queue             -> list_queue (public)
/// POST /jobs/{job_id}/cancel  -> cancel_job (host)
/// ```
pub fn event_router(kind: BoothKind) -> Router<AppState> {
    Router::new()
        .route("/", post(booth::enqueue_job))
        .route("/queue", get(booth::list_queue))
        .route("/jobs/{job_id}/cancel", post(booth::cancel_job))
        .layer(Extension(kind))
}

/// Job status routes, mounted at `/{kind}`.
///
/// ```text
/// GET /jobs/{id}  -> get_job (public)
/// ```
pub fn job_router(kind: BoothKind) -> Router<AppState> {
    Router::new()
        .route("/jobs/{id}", get(booth::get_job))
        .layer(Extension(kind))
}

/// Booth hardware routes, mounted at `/booth/{kind}`. API key with the
/// `booth:write` scope required.
///
/// ```text
/// POST /next       -> claim_next
/// PUT  /jobs/{id}  -> report_status
/// ```
pub fn hardware_router(kind: BoothKind) -> Router<AppState> {
    Router::new()
        .route("/next", post(booth::claim_next))
        .route("/jobs/{id}", put(booth::report_status))
        .layer(Extension(kind))
}
