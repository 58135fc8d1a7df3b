//! Client IP resolution and the per-IP limit on anonymous guest endpoints.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::error::AppError;
use crate::state::AppState;

/// Client address. Behind a trusted proxy the first `X-Forwarded-For` hop,
/// then `X-Real-IP`; otherwise, and as fallback, the socket peer, else
/// `"unknown"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

fn from_headers(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    forwarded.or_else(real_ip).map(str::to_string)
}

fn resolve(parts: &Parts, trust_forwarded: bool) -> String {
    trust_forwarded
        .then(|| from_headers(&parts.headers))
        .flatten()
        .or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(resolve(parts, state.config.trust_forwarded_headers)))
    }
}

/// Counts the request against the guest budget of the caller's IP and
/// rejects with 429 once it is spent.
#[derive(Debug, Clone)]
pub struct GuestRateLimit(pub ClientIp);

impl FromRequestParts<AppState> for GuestRateLimit {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ip = ClientIp::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|never| match never {});
        let limit = state.config.guest_rate_limit_per_min;
        let decision = state.rate_limiter.check(&format!("guest:{}", ip.0), limit);
        if !decision.allowed {
            tracing::warn!(client_ip = %ip.0, limit, "Guest rate limit exceeded");
            return Err(AppError::TooManyRequests {
                message: "Too many requests, please wait a moment".to_string(),
                retry_after_secs: decision.reset_after_secs,
            });
        }
        Ok(GuestRateLimit(ip))
    }
}
