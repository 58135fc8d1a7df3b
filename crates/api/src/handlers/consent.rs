//! Proxy for the WordPress cookie/privacy consent endpoint.

use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::middleware::guest::GuestRateLimit;
use crate::state::AppState;

/// Upper bound for one upstream round trip.
const CONSENT_TIMEOUT: Duration = Duration::from_secs(10);

/// POST /api/v1/public/consent
///
/// Forwards the JSON body and relays the upstream status and JSON answer.
/// 503 when no upstream is configured, 502 when it cannot be reached or
/// does not answer with JSON.
pub async fn forward_consent(
    GuestRateLimit(_ip): GuestRateLimit,
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let url = state
        .config
        .wordpress_consent_url
        .as_deref()
        .ok_or_else(|| AppError::Upstream {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "Consent service is not configured".into(),
        })?;

    let response = state
        .http
        .post(url)
        .timeout(CONSENT_TIMEOUT)
        .json(&body)
        .send()
        .await
        .map_err(|e| AppError::Upstream {
            status: StatusCode::BAD_GATEWAY,
            message: format!("Consent service unreachable: {e}"),
        })?;

    let status =
        StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let payload: serde_json::Value = response.json().await.map_err(|e| AppError::Upstream {
        status: StatusCode::BAD_GATEWAY,
        message: format!("Consent service sent an invalid response: {e}"),
    })?;

    tracing::debug!(status = %status, "Consent request forwarded");
    Ok((status, Json(payload)))
}
