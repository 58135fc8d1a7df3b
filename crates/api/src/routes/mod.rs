pub mod admin;
pub mod auth;
pub mod booth;
pub mod events;
pub mod health;
pub mod invoices;
pub mod public;
pub mod workflows;

use axum::Router;
use gaestefotos_core::booth::BoothKind;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register, /auth/login, /auth/refresh        public
/// /auth/logout, /auth/me                            authenticated
///
/// /public/events/{slug}                             guest event view
/// /public/events/{slug}/uploads                     guest upload (multipart)
/// /public/events/{slug}/photos                      approved gallery
/// /public/events/{slug}/mosaic                      live mosaic wall
/// /public/packages                                  active packages
/// /public/consent                                   WordPress consent proxy
///
/// /events                                           host event CRUD
/// /events/{id}/categories|photos|mosaic|...         host sub-resources
/// /events/{id}/drawbot|spinner                      enqueue, queue, cancel
///
/// /drawbot/jobs/{id}, /spinner/jobs/{id}            job status + position
/// /booth/drawbot|spinner/next, /jobs/{id}           booth hardware (API key)
///
/// /workflows/by-type/{type}, /workflows/{id}/next   public workflow lookups
///
/// /invoices                                         host's own invoices
///
/// /admin/...                                        admin area
/// ```
pub fn api_routes() -> Router<AppState> {
    let mut router = Router::new()
        .nest("/auth", auth::router())
        .nest("/public", public::router())
        .nest("/events", events::router())
        .nest("/workflows", workflows::router())
        .nest("/invoices", invoices::router())
        .nest("/admin", admin::router());

    for kind in BoothKind::ALL {
        router = router
            .nest(
                &format!("/events/{{id}}/{}", kind.as_str()),
                booth::event_router(kind),
            )
            .nest(&format!("/{}", kind.as_str()), booth::job_router(kind))
            .nest(
                &format!("/booth/{}", kind.as_str()),
                booth::hardware_router(kind),
            );
    }
    router
}
