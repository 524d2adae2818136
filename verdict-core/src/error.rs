//! Error types for Verdict

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for Verdict operations
pub type Result<T> = std::result::Result<T, Error>;

/// Why a run was cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The caller triggered the cancellation token
    Requested,
    /// The configured timeout elapsed before the tool exited
    TimedOut(Duration),
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Requested => write!(f, "cancelled by request"),
            CancelReason::TimedOut(timeout) => {
                write!(f, "timed out after {:.1}s", timeout.as_secs_f64())
            }
        }
    }
}

/// Error type for Verdict operations
#[derive(Error, Debug)]
pub enum Error {
    /// The external test tool could not be started
    #[error("Failed to launch '{tool}': {source}")]
    Launch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error while capturing output or waiting for the tool
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The run was cancelled and the tool was killed
    #[error("Test run {0}")]
    Cancelled(CancelReason),

    /// The target path was rejected before launching anything
    #[error("Invalid test target: {0}")]
    InvalidTarget(String),

    /// A run is already in flight on this controller
    #[error("A test run is already in progress")]
    Busy,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error came from a cancellation or timeout
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled(_))
    }
}
