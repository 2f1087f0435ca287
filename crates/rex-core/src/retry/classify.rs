//! Classify operation failures into retry error kinds.

use std::io;

use super::error::RequestError;

/// High-level classification of an error for retry purposes.
///
/// Callers map HTTP statuses, IO failures or their own error types into these
/// kinds by implementing [`Classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network-level failure before any response arrived (reset, refused, DNS).
    Connection,
    /// Operation timed out without a response.
    Timeout,
    /// A response arrived carrying this status code.
    Status(u16),
    /// Anything else (not retried by the default predicate).
    Other,
}

impl ErrorKind {
    /// True when no response was received at all.
    pub fn is_transport(self) -> bool {
        matches!(self, ErrorKind::Connection | ErrorKind::Timeout)
    }
}

/// Errors that can describe themselves as an [`ErrorKind`].
pub trait Classify {
    fn classify(&self) -> ErrorKind;
}

/// Default retry predicate: retry when no response was received or the
/// response status is 5xx.
pub fn default_is_retryable<E: Classify>(err: &E) -> bool {
    match err.classify() {
        ErrorKind::Connection | ErrorKind::Timeout => true,
        ErrorKind::Status(code) => code >= 500,
        ErrorKind::Other => false,
    }
}

/// Classify an IO error for retry decisions.
pub fn classify_io_error(e: &io::Error) -> ErrorKind {
    match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ErrorKind::Timeout,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::NotConnected
        | io::ErrorKind::AddrNotAvailable
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::UnexpectedEof => ErrorKind::Connection,
        _ => ErrorKind::Other,
    }
}

impl Classify for io::Error {
    fn classify(&self) -> ErrorKind {
        classify_io_error(self)
    }
}

impl Classify for RequestError {
    fn classify(&self) -> ErrorKind {
        match self {
            RequestError::Status { code, .. } => ErrorKind::Status(*code),
            RequestError::Connection(_) => ErrorKind::Connection,
            RequestError::Timeout => ErrorKind::Timeout,
            RequestError::Cancelled(_) | RequestError::Other(_) => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::Cancelled;

    #[test]
    fn status_5xx_retryable() {
        assert!(default_is_retryable(&RequestError::status(500)));
        assert!(default_is_retryable(&RequestError::status(503)));
        assert!(default_is_retryable(&RequestError::status(599)));
    }

    #[test]
    fn status_4xx_terminal() {
        assert!(!default_is_retryable(&RequestError::status(404)));
        assert!(!default_is_retryable(&RequestError::status(400)));
        assert!(!default_is_retryable(&RequestError::status(429)));
    }

    #[test]
    fn no_response_retryable() {
        assert!(default_is_retryable(&RequestError::Connection(
            "network unreachable".into()
        )));
        assert!(default_is_retryable(&RequestError::Timeout));
    }

    #[test]
    fn unclassified_errors_terminal() {
        assert!(!default_is_retryable(&RequestError::Other("bad json".into())));
        assert!(!default_is_retryable(&RequestError::Cancelled(Cancelled)));
    }

    #[test]
    fn io_errors_classified() {
        let reset = io::Error::from(io::ErrorKind::ConnectionReset);
        assert_eq!(classify_io_error(&reset), ErrorKind::Connection);
        let timeout = io::Error::from(io::ErrorKind::TimedOut);
        assert_eq!(classify_io_error(&timeout), ErrorKind::Timeout);
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(classify_io_error(&denied), ErrorKind::Other);
        assert!(default_is_retryable(&reset));
        assert!(!default_is_retryable(&denied));
    }

    #[test]
    fn transport_kinds() {
        assert!(ErrorKind::Connection.is_transport());
        assert!(ErrorKind::Timeout.is_transport());
        assert!(!ErrorKind::Status(502).is_transport());
        assert!(!ErrorKind::Other.is_transport());
    }
}
