//! Structured error types for punchcard
//!
//! Every failure mode of a check-in run maps to one variant, so the CLI and
//! the scheduler can report which stage went wrong. Transport failures are
//! kept separate from an explicit rejection by the portal: "could not reach
//! the site" and "the site said no" are different operator problems.

use std::fmt;
use thiserror::Error;

/// Pipeline stage at which a network exchange happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Dashboard,
    TaskList,
    Submission,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Dashboard => write!(f, "dashboard fetch"),
            Stage::TaskList => write!(f, "task list fetch"),
            Stage::Submission => write!(f, "check-in submission"),
        }
    }
}

/// Primary error type for check-in operations
#[derive(Error, Debug)]
pub enum PunchError {
    /// A required configuration field is absent. Reported before any
    /// network call is made.
    #[error("{field} is not set")]
    MissingField { field: &'static str },

    /// The dashboard page contained no class markers.
    #[error("no classes found on the student dashboard")]
    NoClasses,

    /// Several classes were found but no pin or selection narrowed them
    /// down to one. Raised on unattended runs where prompting is impossible.
    #[error("{count} classes found but none pinned; set a class id to check in unattended")]
    AmbiguousClass { count: usize },

    /// The operator's class selection was non-numeric or out of range.
    #[error("invalid class selection: {input:?}")]
    InvalidSelection { input: String },

    /// The class's task list page contained no active check-in task.
    #[error("no active check-in task for class {class_id}")]
    NoTask { class_id: String },

    /// The request never completed (connect, timeout, decode).
    #[error("{stage} failed: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },

    /// The portal answered with a non-success status.
    #[error("{stage} returned HTTP {status}")]
    UnexpectedStatus { stage: Stage, status: u16 },

    /// A response arrived but the success phrase was absent.
    #[error("check-in rejected by the portal")]
    Rejected,

    /// Auto check-in time strings must be HH:MM.
    #[error("invalid auto check-in time {value:?}, expected HH:MM")]
    InvalidAutoTime { value: String },
}

impl PunchError {
    /// True when the site was never reached or answered abnormally, as
    /// opposed to a well-formed response that classified as failure.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::UnexpectedStatus { .. }
        )
    }

    /// True for errors the operator must fix in configuration before any
    /// retry can succeed.
    pub fn requires_operator_action(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. }
                | Self::AmbiguousClass { .. }
                | Self::InvalidSelection { .. }
                | Self::InvalidAutoTime { .. }
        )
    }
}

/// Result type alias using PunchError
pub type Result<T> = std::result::Result<T, PunchError>;
