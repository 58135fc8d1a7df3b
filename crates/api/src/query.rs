//! Query-string types shared by list endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use gaestefotos_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use gaestefotos_core::types::{DbId, Timestamp};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationQuery {
    pub fn limit(&self) -> i64 {
        clamp_limit(self.limit, DEFAULT_LIMIT, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        clamp_offset(self.offset)
    }
}

/// Filters for photo lists.
///
/// `from` and `to` accept a calendar date (`2026-06-13`) or an RFC 3339
/// timestamp. A bare `to` date includes that whole day.
#[derive(Debug, Default, Deserialize)]
pub struct PhotoQuery {
    /// Comma-separated statuses. Ignored on the public gallery.
    pub status: Option<String>,
    pub category_id: Option<DbId>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PhotoQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            limit: self.limit,
            offset: self.offset,
        }
    }

    /// Parsed `(from, to)` bounds; `to` is exclusive.
    pub fn date_range(&self) -> AppResult<(Option<Timestamp>, Option<Timestamp>)> {
        let from = self
            .from
            .as_deref()
            .map(|raw| parse_date_bound(raw, false))
            .transpose()
            .map_err(AppError::BadRequest)?;
        let to = self
            .to
            .as_deref()
            .map(|raw| parse_date_bound(raw, true))
            .transpose()
            .map_err(AppError::BadRequest)?;
        if let (Some(from), Some(to)) = (from, to) {
            if to <= from {
                return Err(AppError::BadRequest(
                    "'to' must be after 'from'".to_string(),
                ));
            }
        }
        Ok((from, to))
    }
}

/// Parse one end of a date range. Dates map to midnight UTC; an upper
/// bound date maps to the following midnight.
pub fn parse_date_bound(raw: &str, upper: bool) -> Result<Timestamp, String> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return day_bound(date, upper).ok_or_else(|| format!("Invalid date '{raw}'"));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("Invalid date '{raw}', expected YYYY-MM-DD or RFC 3339"))
}

/// Midnight UTC of `date`, or of the day after for an upper bound. `None`
/// past the end of the calendar.
fn day_bound(date: NaiveDate, upper: bool) -> Option<Timestamp> {
    let day = if upper { date.succ_opt()? } else { date };
    day.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}
