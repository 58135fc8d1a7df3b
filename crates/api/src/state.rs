use std::sync::Arc;

use gaestefotos_core::rate_limit::RateLimiter;

use crate::config::ServerConfig;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone; everything heavy sits behind an `Arc` or is a handle.
#[derive(Clone)]
pub struct AppState {
    pub pool: gaestefotos_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Per-process request windows for API keys and guest IPs.
    pub rate_limiter: Arc<RateLimiter>,
    /// Outbound client for the consent proxy.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(pool: gaestefotos_db::DbPool, config: ServerConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            rate_limiter: Arc::new(RateLimiter::default()),
            http: reqwest::Client::new(),
        }
    }
}
