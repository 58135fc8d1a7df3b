//! In-memory fixed-window rate limiter.
//!
//! Keys are opaque strings such as `apikey:17:write` or `guest:203.0.113.9`.
//! Each key gets a counter that resets one window after its first hit.
//! State is per-process; multiple API replicas each enforce their own
//! windows.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Outcome of a single [`RateLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Seconds until the current window resets (at least 1).
    pub reset_after_secs: u64,
}

/// Point-in-time view of one window, for the ops endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowSnapshot {
    pub key: String,
    pub count: u32,
    pub limit: u32,
    pub window_started_at: chrono::DateTime<chrono::Utc>,
    pub resets_in_secs: u64,
}

#[derive(Debug, Clone)]
struct Window {
    started: Instant,
    started_wall: chrono::DateTime<chrono::Utc>,
    count: u32,
    limit: u32,
}

#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl RateLimiter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Window>> {
        // A poisoned lock only means another request panicked mid-update;
        // the counters are still usable.
        self.windows.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn reset_after(&self, started: Instant, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(started);
        self.window.saturating_sub(elapsed).as_secs().max(1)
    }

    /// Count a hit against `key` and decide whether it is allowed.
    pub fn check(&self, key: &str, limit: u32) -> RateDecision {
        self.check_at(key, limit, Instant::now())
    }

    /// [`check`](Self::check) with an explicit clock.
    pub fn check_at(&self, key: &str, limit: u32, now: Instant) -> RateDecision {
        let mut windows = self.lock();
        let window = windows.entry(key.to_string()).or_insert_with(|| Window {
            started: now,
            started_wall: chrono::Utc::now(),
            count: 0,
            limit,
        });

        if now.saturating_duration_since(window.started) >= self.window {
            window.started = now;
            window.started_wall = chrono::Utc::now();
            window.count = 0;
        }
        window.limit = limit;

        let allowed = window.count < limit;
        if allowed {
            window.count += 1;
        }

        RateDecision {
            allowed,
            limit,
            remaining: limit.saturating_sub(window.count),
            reset_after_secs: self.reset_after(window.started, now),
        }
    }

    /// Drop windows that have expired. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut windows = self.lock();
        let before = windows.len();
        windows.retain(|_, w| now.saturating_duration_since(w.started) < self.window);
        before - windows.len()
    }

    /// Snapshot of all live windows sorted by key.
    pub fn snapshot(&self) -> Vec<WindowSnapshot> {
        let now = Instant::now();
        let windows = self.lock();
        let mut out: Vec<WindowSnapshot> = windows
            .iter()
            .filter(|(_, w)| now.saturating_duration_since(w.started) < self.window)
            .map(|(key, w)| WindowSnapshot {
                key: key.clone(),
                count: w.count,
                limit: w.limit,
                window_started_at: w.started_wall,
                resets_in_secs: self.reset_after(w.started, now),
            })
            .collect();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        out
    }
}
