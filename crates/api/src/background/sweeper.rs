//! Periodic housekeeping: drops idle rate-limit windows and purges expired
//! or revoked refresh sessions.

use std::sync::Arc;
use std::time::Duration;

use gaestefotos_core::rate_limit::RateLimiter;
use gaestefotos_db::repositories::session_repo::PURGE_BATCH_SIZE;
use gaestefotos_db::repositories::SessionRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Sessions are purged once per this many sweeps.
const SESSION_CLEANUP_EVERY: u64 = 60;

/// Run the sweep loop every `interval` until `cancel` fires.
pub async fn run(
    pool: PgPool,
    limiter: Arc<RateLimiter>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = interval.as_secs(), "Sweeper started");

    let mut ticker = tokio::time::interval(interval);
    let mut ticks: u64 = 0;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Sweeper stopping");
                break;
            }
            _ = ticker.tick() => {
                let dropped = limiter.sweep();
                if dropped > 0 {
                    tracing::debug!(dropped, "Rate limit windows swept");
                }

                ticks += 1;
                if ticks % SESSION_CLEANUP_EVERY == 0 {
                    match SessionRepo::purge_stale(&pool, PURGE_BATCH_SIZE).await {
                        Ok(0) => {}
                        Ok(deleted) => tracing::info!(deleted, "Expired sessions purged"),
                        Err(e) => tracing::error!(error = %e, "Session cleanup failed"),
                    }
                }
            }
        }
    }
}
