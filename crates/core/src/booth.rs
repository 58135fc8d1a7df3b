//! Drawbot and spinner booth job queues.
//!
//! Both booths share one status model: a guest enqueues a job, the booth
//! hardware claims it, then reports the outcome.
//!
//! ```text
//! QUEUED ──claim──> PROCESSING ──> DONE
//!   │                   │
//!   │                   ├────────> FAILED
//!   └──────────────────>└────────> CANCELLED
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which booth a queue belongs to. Each kind has its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoothKind {
    Drawbot,
    Spinner,
}

impl BoothKind {
    pub const ALL: [BoothKind; 2] = [BoothKind::Drawbot, BoothKind::Spinner];

    pub fn as_str(self) -> &'static str {
        match self {
            BoothKind::Drawbot => "drawbot",
            BoothKind::Spinner => "spinner",
        }
    }

    /// Backing table name. Only ever interpolated from this closed set.
    pub fn table(self) -> &'static str {
        match self {
            BoothKind::Drawbot => "drawbot_jobs",
            BoothKind::Spinner => "spinner_jobs",
        }
    }

    /// Feature flag gating this booth.
    pub fn flag_key(self) -> &'static str {
        match self {
            BoothKind::Drawbot => crate::feature_flags::keys::DRAWBOT,
            BoothKind::Spinner => crate::feature_flags::keys::SPINNER,
        }
    }

    /// Entity name used in not-found errors.
    pub fn entity(self) -> &'static str {
        match self {
            BoothKind::Drawbot => "DrawbotJob",
            BoothKind::Spinner => "SpinnerJob",
        }
    }
}

impl fmt::Display for BoothKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoothJobStatus {
    Queued,
    Processing,
    Done,
    Failed,
    Cancelled,
}

impl BoothJobStatus {
    pub const ALL: [BoothJobStatus; 5] = [
        BoothJobStatus::Queued,
        BoothJobStatus::Processing,
        BoothJobStatus::Done,
        BoothJobStatus::Failed,
        BoothJobStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BoothJobStatus::Queued => "QUEUED",
            BoothJobStatus::Processing => "PROCESSING",
            BoothJobStatus::Done => "DONE",
            BoothJobStatus::Failed => "FAILED",
            BoothJobStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BoothJobStatus::Done | BoothJobStatus::Failed | BoothJobStatus::Cancelled
        )
    }

    pub fn valid_transitions(self) -> &'static [BoothJobStatus] {
        match self {
            BoothJobStatus::Queued => &[BoothJobStatus::Processing, BoothJobStatus::Cancelled],
            BoothJobStatus::Processing => &[
                BoothJobStatus::Done,
                BoothJobStatus::Failed,
                BoothJobStatus::Cancelled,
            ],
            BoothJobStatus::Done | BoothJobStatus::Failed | BoothJobStatus::Cancelled => &[],
        }
    }

    pub fn can_transition(self, to: BoothJobStatus) -> bool {
        self.valid_transitions().contains(&to)
    }

    pub fn validate_transition(self, to: BoothJobStatus) -> Result<(), String> {
        if self.can_transition(to) {
            Ok(())
        } else if self.is_terminal() {
            Err(format!("Job is already {self} and cannot change status"))
        } else {
            Err(format!("Cannot move job from {self} to {to}"))
        }
    }
}

impl fmt::Display for BoothJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoothJobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BoothJobStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown job status '{s}'"))
    }
}

/// Maximum length of a failure message reported by booth hardware.
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 1000;

/// Truncate an error message reported by the booth to the stored limit.
pub fn clip_error_message(message: &str) -> String {
    message.chars().take(MAX_ERROR_MESSAGE_LENGTH).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_happy_path() {
        assert!(BoothJobStatus::Queued.can_transition(BoothJobStatus::Processing));
        assert!(BoothJobStatus::Processing.can_transition(BoothJobStatus::Done));
    }

    #[test]
    fn queued_cannot_skip_processing() {
        assert!(!BoothJobStatus::Queued.can_transition(BoothJobStatus::Done));
        assert!(!BoothJobStatus::Queued.can_transition(BoothJobStatus::Failed));
    }

    #[test]
    fn no_way_back_to_queued() {
        for status in BoothJobStatus::ALL {
            assert!(!status.can_transition(BoothJobStatus::Queued));
        }
    }

    #[test]
    fn terminal_states_have_no_transitions() {
        for status in BoothJobStatus::ALL.into_iter().filter(|s| s.is_terminal()) {
            assert!(status.valid_transitions().is_empty());
            let err = status
                .validate_transition(BoothJobStatus::Processing)
                .unwrap_err();
            assert!(err.contains("already"));
        }
    }

    #[test]
    fn parse_round_trips_names() {
        for status in BoothJobStatus::ALL {
            assert_eq!(status.as_str().parse::<BoothJobStatus>(), Ok(status));
        }
        assert!("WAITING".parse::<BoothJobStatus>().is_err());
    }

    #[test]
    fn booth_tables_are_distinct() {
        assert_ne!(BoothKind::Drawbot.table(), BoothKind::Spinner.table());
    }

    #[test]
    fn error_messages_are_clipped() {
        let long = "e".repeat(MAX_ERROR_MESSAGE_LENGTH * 2);
        assert_eq!(clip_error_message(&long).len(), MAX_ERROR_MESSAGE_LENGTH);
    }
}
