//! `X-API-Key` authentication for booth hardware and integrations.
//!
//! A key is accepted when it is active, not revoked and not expired. Each
//! request counts against the key's per-minute read or write budget,
//! depending on the HTTP method.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::Method;
use chrono::Utc;
use gaestefotos_core::api_keys::{hash_api_key, looks_like_api_key, scope_allows};
use gaestefotos_core::error::CoreError;
use gaestefotos_core::types::DbId;
use gaestefotos_db::models::api_key::ApiKey;
use gaestefotos_db::repositories::ApiKeyRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone)]
pub struct ApiKeyAuth {
    pub key: ApiKey,
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.to_string()))
}

fn is_read(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

impl FromRequestParts<AppState> for ApiKeyAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .ok_or_else(|| unauthorized("Missing X-API-Key header"))?;

        if !looks_like_api_key(raw) {
            return Err(unauthorized("Invalid API key"));
        }

        let key = ApiKeyRepo::find_by_hash(&state.pool, &hash_api_key(raw))
            .await?
            .ok_or_else(|| unauthorized("Invalid API key"))?;

        if !key.is_usable(Utc::now()) {
            return Err(unauthorized("API key is inactive, revoked or expired"));
        }

        let (bucket, limit) = if is_read(&parts.method) {
            ("read", key.rate_limit_read_per_min)
        } else {
            ("write", key.rate_limit_write_per_min)
        };
        let decision = state.rate_limiter.check(
            &format!("apikey:{}:{bucket}", key.id),
            u32::try_from(limit).unwrap_or(0),
        );
        if !decision.allowed {
            tracing::warn!(api_key_id = key.id, bucket, limit, "API key rate limit exceeded");
            return Err(AppError::TooManyRequests {
                message: format!("API key {bucket} limit of {limit} requests per minute exceeded"),
                retry_after_secs: decision.reset_after_secs,
            });
        }

        if let Err(e) = ApiKeyRepo::touch_last_used(&state.pool, key.id).await {
            tracing::warn!(api_key_id = key.id, error = %e, "Failed to record API key use");
        }

        Ok(ApiKeyAuth { key })
    }
}

impl ApiKeyAuth {
    /// 403 unless the key carries `scope`.
    pub fn require_scope(&self, scope: &str) -> AppResult<()> {
        if scope_allows(&self.key.scopes, scope) {
            Ok(())
        } else {
            Err(AppError::Core(CoreError::Forbidden(format!(
                "API key lacks the '{scope}' scope"
            ))))
        }
    }

    /// 403 when the key is bound to a different event.
    pub fn ensure_event(&self, event_id: DbId) -> AppResult<()> {
        match self.key.event_id {
            Some(bound) if bound != event_id => Err(AppError::Core(CoreError::Forbidden(
                "API key is not valid for this event".into(),
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_methods_use_the_read_budget() {
        assert!(is_read(&Method::GET));
        assert!(is_read(&Method::HEAD));
        assert!(!is_read(&Method::POST));
        assert!(!is_read(&Method::PUT));
        assert!(!is_read(&Method::DELETE));
    }
}
