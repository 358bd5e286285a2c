//! Error types for Curator.

use thiserror::Error;

/// Result type alias using Curator's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Curator.
#[derive(Error, Debug)]
pub enum Error {
    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] HttpError),

    #[error("Network error: {0}")]
    Network(String),

    // Remote service errors
    #[error("Service temporarily unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    // Snapshot and reconciliation errors
    #[error("Malformed entry at position {position:?}: {reason}")]
    MalformedEntry {
        position: Option<usize>,
        reason: String,
    },

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    // Retry policy errors
    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<Error> },

    #[error("Circuit breaker open after {failures} consecutive transient failures: {last}")]
    CircuitOpen { failures: u32, last: Box<Error> },

    // Backup errors
    #[error("Download failed: {0}")]
    Download(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// HTTP-specific errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed with status {status}: {message}")]
    StatusError { status: u16, message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl Error {
    /// Returns true if this error is expected to resolve itself with a retry.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::ServiceUnavailable(_) | Self::Network(_) | Self::RateLimited { .. } => true,
            Self::Http(HttpError::ConnectionFailed(_) | HttpError::Timeout) => true,
            Self::Http(HttpError::StatusError { status, .. }) => *status >= 500,
            _ => false,
        }
    }

    /// Returns true if this is a rate limit error.
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Shorthand for a malformed entry.
    pub fn malformed(position: Option<usize>, reason: impl Into<String>) -> Self {
        Self::MalformedEntry {
            position,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_transient() {
        assert!(Error::ServiceUnavailable("backend".into()).is_transient());
        assert!(Error::RateLimited {
            retry_after_secs: Some(60)
        }
        .is_transient());
        assert!(Error::Http(HttpError::StatusError {
            status: 503,
            message: "unavailable".into()
        })
        .is_transient());
        assert!(!Error::Http(HttpError::StatusError {
            status: 400,
            message: "bad request".into()
        })
        .is_transient());
        assert!(!Error::NotFound("item".into()).is_transient());
        assert!(!Error::InvariantViolation("drift".into()).is_transient());
    }

    #[test]
    fn test_error_rate_limited() {
        assert!(Error::RateLimited {
            retry_after_secs: None
        }
        .is_rate_limited());
        assert!(!Error::ServiceUnavailable("backend".into()).is_rate_limited());
    }

    #[test]
    fn test_error_display() {
        let err = Error::malformed(Some(3), "missing videoId");
        assert_eq!(
            err.to_string(),
            "Malformed entry at position Some(3): missing videoId"
        );
    }
}
