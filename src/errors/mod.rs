//! Error handling module for the sync engine.
//!
//! Remote collaborators report failures through [`RemoteError`]. Coordinators
//! never hand these to callers; they are logged and turned into a local-only
//! outcome at the coordinator boundary.

use thiserror::Error;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const SERVER_ERROR: &str = "SERVER_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const UNSUPPORTED: &str = "UNSUPPORTED";
}

/// Result type for remote store calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors a remote store client can report.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request never reached the store
    #[error("network error: {0}")]
    Network(String),

    /// The store answered with a failure status
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// The addressed record does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The collection does not support the operation
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

impl RemoteError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            RemoteError::Network(_) => codes::NETWORK_ERROR,
            RemoteError::Server { .. } => codes::SERVER_ERROR,
            RemoteError::NotFound(_) => codes::NOT_FOUND,
            RemoteError::Unsupported(_) => codes::UNSUPPORTED,
        }
    }

    /// Whether the error means "no counterpart exists", which callers treat
    /// as a create-instead signal rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            RemoteError::Network("timeout".into()).error_code(),
            codes::NETWORK_ERROR
        );
        assert_eq!(
            RemoteError::Server {
                status: 503,
                message: "unavailable".into()
            }
            .error_code(),
            codes::SERVER_ERROR
        );
        assert_eq!(
            RemoteError::Unsupported("archive".into()).error_code(),
            codes::UNSUPPORTED
        );
    }

    #[test]
    fn test_display_includes_status() {
        let err = RemoteError::Server {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "server error 500: boom");
        assert!(RemoteError::NotFound("brand x".into()).is_not_found());
        assert!(!err.is_not_found());
    }
}
