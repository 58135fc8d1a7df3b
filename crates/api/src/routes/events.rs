//! Route definitions for host-managed events and their sub-resources.
//!
//! Mounted at `/events` by `api_routes()`. Booth queue routes under
//! `/events/{id}/drawbot` and `/spinner` live in [`super::booth`].

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{categories, events, feature_flags, mosaic, photos};
use crate::state::AppState;

/// Event routes.
///
/// ```text
/// GET, POST         /                                   list_events, create_event
/// GET, PUT, DELETE  /{id}                               get_event, update_event, delete_event
/// GET               /{id}/stats                         event_stats
///
/// GET, POST         /{id}/categories                    list_categories, create_category
/// PUT, DELETE       /{id}/categories/{category_id}      update_category, delete_category
///
/// GET               /{id}/photos                        list_event_photos
/// POST              /{id}/photos/bulk-moderate          bulk_moderate
/// PUT, DELETE       /{id}/photos/{photo_id}             update_photo, delete_photo
/// POST              /{id}/photos/{photo_id}/moderate    moderate_photo
///
/// GET, PUT          /{id}/mosaic                        get_wall, upsert_wall
/// POST              /{id}/mosaic/tiles                  place_tile
/// DELETE            /{id}/mosaic/tiles/{tile_id}        delete_tile
/// POST              /{id}/mosaic/auto-fill              auto_fill
///
/// GET               /{id}/feature-flags                 list_event_flags
/// PUT, DELETE       /{id}/feature-flags/{key}           set_event_override, delete_event_override
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(events::list_events).post(events::create_event))
        .route(
            "/{id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/{id}/stats", get(photos::event_stats))
        // Categories
        .route(
            "/{id}/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/{id}/categories/{category_id}",
            put(categories::update_category).delete(categories::delete_category),
        )
        // Photos
        .route("/{id}/photos", get(photos::list_event_photos))
        .route("/{id}/photos/bulk-moderate", post(photos::bulk_moderate))
        .route(
            "/{id}/photos/{photo_id}",
            put(photos::update_photo).delete(photos::delete_photo),
        )
        .route(
            "/{id}/photos/{photo_id}/moderate",
            post(photos::moderate_photo),
        )
        // Mosaic
        .route("/{id}/mosaic", get(mosaic::get_wall).put(mosaic::upsert_wall))
        .route("/{id}/mosaic/tiles", post(mosaic::place_tile))
        .route("/{id}/mosaic/tiles/{tile_id}", delete(mosaic::delete_tile))
        .route("/{id}/mosaic/auto-fill", post(mosaic::auto_fill))
        // Feature flag overrides
        .route("/{id}/feature-flags", get(feature_flags::list_event_flags))
        .route(
            "/{id}/feature-flags/{key}",
            put(feature_flags::set_event_override).delete(feature_flags::delete_event_override),
        )
}
