//! Error types shared by the executor and its callers.

use thiserror::Error;

/// Returned (through `From<Cancelled>`) when a cancellation token fires before
/// an attempt or during the backoff sleep. Never passed to the retry predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Generic request failure for callers that do not bring their own error type.
#[derive(Debug, Error)]
pub enum RequestError {
    /// A response arrived with a non-success status.
    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },
    /// No response: connection refused/reset, DNS failure, network unreachable.
    #[error("connection failed: {0}")]
    Connection(String),
    /// No response within the caller's deadline.
    #[error("request timed out")]
    Timeout,
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    #[error("{0}")]
    Other(String),
}

impl RequestError {
    /// Status error with an empty message.
    pub fn status(code: u16) -> Self {
        RequestError::Status {
            code,
            message: String::new(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RequestError::Cancelled(_))
    }
}
