//! Route definitions for anonymous guest endpoints.
//!
//! Mounted at `/public` by `api_routes()`. Uploads and the consent proxy
//! are rate limited per client IP.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{consent, events, mosaic, packages, photos};
use crate::state::AppState;

/// Public routes.
///
/// ```text
/// GET  /events/{slug}           -> get_public_event
/// POST /events/{slug}/uploads   -> upload_photo (multipart)
/// GET  /events/{slug}/photos    -> list_gallery
/// GET  /events/{slug}/mosaic    -> get_public_wall
/// GET  /packages                -> list_public_packages
/// POST /consent                 -> forward_consent
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events/{slug}", get(events::get_public_event))
        .route("/events/{slug}/uploads", post(photos::upload_photo))
        .route("/events/{slug}/photos", get(photos::list_gallery))
        .route("/events/{slug}/mosaic", get(mosaic::get_public_wall))
        .route("/packages", get(packages::list_public_packages))
        .route("/consent", post(consent::forward_consent))
}
