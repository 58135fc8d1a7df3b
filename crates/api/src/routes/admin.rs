//! Route definitions for the admin area.
//!
//! Mounted at `/admin` by `api_routes()`. Every handler requires the
//! `admin` role.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{api_keys, feature_flags, invoices, ops, packages, workflows};
use crate::state::AppState;

/// Admin routes.
///
/// ```text
/// GET, POST         /api-keys                      list_api_keys, create_api_key
/// PUT               /api-keys/{id}                 update_api_key
/// POST              /api-keys/{id}/rotate          rotate_api_key
/// POST              /api-keys/{id}/revoke          revoke_api_key
///
/// GET, POST         /packages                      list_packages, create_package
/// GET, PUT, DELETE  /packages/{id}                 get_package, update_package, delete_package
///
/// GET, POST         /invoices                      list_invoices, create_invoice
/// POST              /invoices/{id}/status          update_invoice_status
///
/// GET, POST         /workflows                     list_workflows, create_workflow
/// GET, PUT, DELETE  /workflows/{id}                get_workflow, update_workflow, delete_workflow
/// POST              /workflows/{id}/set-default    set_default_workflow
///
/// GET, POST         /feature-flags                 list_flags, create_flag
/// PUT, DELETE       /feature-flags/{key}           update_flag, delete_flag
///
/// GET               /ops/rate-limits               rate_limits
/// GET               /ops/queues                    queues
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        // API keys
        .route(
            "/api-keys",
            get(api_keys::list_api_keys).post(api_keys::create_api_key),
        )
        .route("/api-keys/{id}", put(api_keys::update_api_key))
        .route("/api-keys/{id}/rotate", post(api_keys::rotate_api_key))
        .route("/api-keys/{id}/revoke", post(api_keys::revoke_api_key))
        // Packages
        .route(
            "/packages",
            get(packages::list_packages).post(packages::create_package),
        )
        .route(
            "/packages/{id}",
            get(packages::get_package)
                .put(packages::update_package)
                .delete(packages::delete_package),
        )
        // Invoices
        .route(
            "/invoices",
            get(invoices::list_invoices).post(invoices::create_invoice),
        )
        .route("/invoices/{id}/status", post(invoices::update_invoice_status))
        // Workflows
        .route(
            "/workflows",
            get(workflows::list_workflows).post(workflows::create_workflow),
        )
        .route(
            "/workflows/{id}",
            get(workflows::get_workflow)
                .put(workflows::update_workflow)
                .delete(workflows::delete_workflow),
        )
        .route(
            "/workflows/{id}/set-default",
            post(workflows::set_default_workflow),
        )
        // Feature flags
        .route(
            "/feature-flags",
            get(feature_flags::list_flags).post(feature_flags::create_flag),
        )
        .route(
            "/feature-flags/{key}",
            put(feature_flags::update_flag).delete(feature_flags::delete_flag),
        )
        // Ops
        .route("/ops/rate-limits", get(ops::rate_limits))
        .route("/ops/queues", get(ops::queues))
}
