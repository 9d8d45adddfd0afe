use serde::{Deserialize, Serialize};
use std::fmt;

/// The five error kinds the core is allowed to surface.
///
/// Deliberately narrower than a typical service's error code table: callers
/// (the boundary adapter, the decay scheduler) only need to know how to
/// react, not which of a hundred specific things went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Validation failure: never retried, surfaced verbatim.
    InvalidInput,
    /// Referenced detection, event, alert, or risk object does not exist.
    NotFound,
    /// Constraint violation that is not a benign duplicate.
    Conflict,
    /// Storage busy/locked; the boundary adapter may retry with backoff.
    Transient,
    /// Storage unreachable, schema mismatch, or panic inside a background task.
    Fatal,
}

impl ErrorKind {
    /// Category label used for logging and metrics grouping.
    pub fn category(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "validation",
            ErrorKind::NotFound => "resource",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Transient => "storage",
            ErrorKind::Fatal => "system",
        }
    }

    /// Whether the boundary adapter may retry this error with backoff (§7).
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Transient)
    }

    /// Whether this error should be logged at error level rather than debug/info.
    pub fn should_log_as_error(&self) -> bool {
        matches!(self, ErrorKind::Transient | ErrorKind::Fatal)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
