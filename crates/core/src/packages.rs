//! Package quota checks.
//!
//! A package caps how much an event may collect. Limits that are `None`
//! are unlimited; events without a package are unlimited as well.

use crate::media::kinds;

/// Limits of a package as relevant to uploads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackageLimits {
    pub max_photos: Option<i32>,
    pub max_videos: Option<i32>,
    pub storage_limit_bytes: Option<i64>,
}

/// What an event has already used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventUsage {
    pub photos: i64,
    pub videos: i64,
    pub bytes: i64,
}

/// Check whether one more upload of `kind` and `size` fits into the limits.
pub fn check_upload_quota(
    limits: &PackageLimits,
    usage: &EventUsage,
    kind: &str,
    size: i64,
) -> Result<(), String> {
    if kind == kinds::VIDEO {
        if let Some(max) = limits.max_videos {
            if usage.videos >= i64::from(max) {
                return Err(format!("The event package allows at most {max} videos"));
            }
        }
    } else if let Some(max) = limits.max_photos {
        if usage.photos >= i64::from(max) {
            return Err(format!("The event package allows at most {max} photos"));
        }
    }
    if let Some(limit) = limits.storage_limit_bytes {
        if usage.bytes.saturating_add(size) > limit {
            return Err("The event package storage limit has been reached".to_string());
        }
    }
    Ok(())
}

/// Validate a package definition's numeric limits.
pub fn validate_limits(limits: &PackageLimits, price_cents: i64) -> Result<(), String> {
    let mut errors = Vec::new();
    if price_cents < 0 {
        errors.push("price_cents must not be negative".to_string());
    }
    if limits.max_photos.is_some_and(|v| v < 0) {
        errors.push("max_photos must not be negative".to_string());
    }
    if limits.max_videos.is_some_and(|v| v < 0) {
        errors.push("max_videos must not be negative".to_string());
    }
    if limits.storage_limit_bytes.is_some_and(|v| v <= 0) {
        errors.push("storage_limit_bytes must be positive".to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}
