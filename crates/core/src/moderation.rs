//! Photo moderation states and the transitions hosts may apply.
//!
//! Statuses are stored as upper-case text in `photos.status`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhotoStatus {
    Pending,
    Approved,
    Rejected,
    Deleted,
}

impl PhotoStatus {
    pub const ALL: [PhotoStatus; 4] = [
        PhotoStatus::Pending,
        PhotoStatus::Approved,
        PhotoStatus::Rejected,
        PhotoStatus::Deleted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PhotoStatus::Pending => "PENDING",
            PhotoStatus::Approved => "APPROVED",
            PhotoStatus::Rejected => "REJECTED",
            PhotoStatus::Deleted => "DELETED",
        }
    }

    /// Status assigned to a fresh guest upload.
    pub fn initial(moderation_required: bool) -> Self {
        if moderation_required {
            PhotoStatus::Pending
        } else {
            PhotoStatus::Approved
        }
    }

    /// Statuses reachable from `self`. `Deleted` is terminal.
    pub fn valid_transitions(self) -> &'static [PhotoStatus] {
        match self {
            PhotoStatus::Pending => &[
                PhotoStatus::Approved,
                PhotoStatus::Rejected,
                PhotoStatus::Deleted,
            ],
            PhotoStatus::Approved => &[PhotoStatus::Rejected, PhotoStatus::Deleted],
            PhotoStatus::Rejected => &[PhotoStatus::Approved, PhotoStatus::Deleted],
            PhotoStatus::Deleted => &[],
        }
    }

    pub fn can_transition(self, to: PhotoStatus) -> bool {
        self.valid_transitions().contains(&to)
    }

    /// Validate a moderation decision, returning an error message for
    /// invalid ones.
    pub fn validate_transition(self, to: PhotoStatus) -> Result<(), String> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(format!("Cannot move photo from {self} to {to}"))
        }
    }
}

impl fmt::Display for PhotoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhotoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PhotoStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown photo status '{s}'"))
    }
}
