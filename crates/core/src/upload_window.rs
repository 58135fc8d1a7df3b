//! When guests may upload to an event.
//!
//! Uploads open one day before the event starts and close seven days after
//! it ends. An event without dates accepts uploads for as long as it is
//! active.

use chrono::Duration;

use crate::types::Timestamp;

/// Days before `starts_at` that uploads open.
pub const OPEN_DAYS_BEFORE: i64 = 1;

/// Days after `ends_at` that uploads stay open.
pub const CLOSE_DAYS_AFTER: i64 = 7;

/// Why an upload was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Open,
    Inactive,
    NotYetOpen,
    Closed,
}

impl WindowState {
    pub fn is_open(self) -> bool {
        self == WindowState::Open
    }

    pub fn message(self) -> &'static str {
        match self {
            WindowState::Open => "Uploads are open",
            WindowState::Inactive => "This event is not active",
            WindowState::NotYetOpen => "Uploads for this event have not opened yet",
            WindowState::Closed => "Uploads for this event are closed",
        }
    }
}

pub fn upload_window_state(
    is_active: bool,
    starts_at: Option<Timestamp>,
    ends_at: Option<Timestamp>,
    now: Timestamp,
) -> WindowState {
    if !is_active {
        return WindowState::Inactive;
    }
    if let Some(start) = starts_at {
        if now < start - Duration::days(OPEN_DAYS_BEFORE) {
            return WindowState::NotYetOpen;
        }
    }
    // Events without an end date close relative to their start.
    if let Some(end) = ends_at.or(starts_at) {
        if now > end + Duration::days(CLOSE_DAYS_AFTER) {
            return WindowState::Closed;
        }
    }
    WindowState::Open
}

/// Validate that an event does not end before it starts.
pub fn validate_event_dates(
    starts_at: Option<Timestamp>,
    ends_at: Option<Timestamp>,
) -> Result<(), String> {
    match (starts_at, ends_at) {
        (Some(start), Some(end)) if end < start => {
            Err("ends_at must not be before starts_at".to_string())
        }
        _ => Ok(()),
    }
}
