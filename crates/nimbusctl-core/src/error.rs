//! Unified error handling for the client-action execution core
//!
//! Four error kinds cover everything the core can surface: a fault on the
//! initial remote call, a tracked operation ending in terminal failure, the
//! overall wait budget running out, and a caller-initiated cancellation.
//! A declined confirmation is not an error; the executor returns an empty
//! result sequence instead.

use std::time::Duration;
use thiserror::Error;

/// Why a tracked operation is reported as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The provider reported terminal failure for the operation.
    Reported,
    /// The operation reported success but the result fetch returned 404.
    ResultNotFoundAfterSuccess,
    /// A status poll failed with a non-transient fault.
    StatusPollFailed,
}

impl FailureReason {
    /// Stable reason code for display and logging.
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::Reported => "reported",
            FailureReason::ResultNotFoundAfterSuccess => "result-not-found-after-success",
            FailureReason::StatusPollFailed => "status-poll-failed",
        }
    }
}

/// Core error type for dispatch, tracking, and result retrieval
#[derive(Error, Debug)]
pub enum CoreError {
    /// Transport or protocol fault on a remote call
    #[error("Remote invocation failed: {message}")]
    RemoteInvocation {
        message: String,
        /// HTTP status, when the fault came from an HTTP response
        http_status_code: Option<u16>,
        /// The request itself timed out (no status available)
        timed_out: bool,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A tracked operation reached terminal Failed state
    #[error("Operation {tracking_id} failed ({}): {status_message}", reason.code())]
    OperationFailed {
        tracking_id: String,
        status_message: String,
        reason: FailureReason,
    },

    /// The overall wait budget was exhausted while the operation was in progress
    #[error("Operation {tracking_id} timed out after {waited:?}; re-query with `operation status {tracking_id}`")]
    OperationTimeout { tracking_id: String, waited: Duration },

    /// The caller aborted tracking; the remote operation itself keeps running
    #[error("Operation {tracking_id} was cancelled")]
    OperationCancelled { tracking_id: String },
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Build a `RemoteInvocation` from an HTTP status and provider message.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        CoreError::RemoteInvocation {
            message: message.into(),
            http_status_code: Some(status),
            timed_out: false,
            source: None,
        }
    }

    /// Build a `RemoteInvocation` for a request that timed out on the wire.
    pub fn request_timeout(message: impl Into<String>) -> Self {
        CoreError::RemoteInvocation {
            message: message.into(),
            http_status_code: None,
            timed_out: true,
            source: None,
        }
    }

    /// Wrap an unclassified failure, preserving the original cause.
    pub fn unclassified(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        CoreError::RemoteInvocation {
            message: source.to_string(),
            http_status_code: None,
            timed_out: false,
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if this is a "not found" fault (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::RemoteInvocation {
                http_status_code: Some(404),
                ..
            }
        )
    }

    /// Returns true if retrying the same request might succeed
    /// (request timeout, 408/429, or any 5xx)
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            CoreError::RemoteInvocation {
                http_status_code,
                timed_out,
                ..
            } => *timed_out || matches!(http_status_code, Some(408 | 429) | Some(500..=599)),
            _ => false,
        }
    }

    /// Returns true if the overall wait budget was exhausted
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, CoreError::OperationTimeout { .. })
    }

    /// Returns true if tracking stopped because the caller aborted
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CoreError::OperationCancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_predicates() {
        assert!(CoreError::http(404, "no such image").is_not_found());
        assert!(!CoreError::http(404, "no such image").is_transient());

        assert!(CoreError::http(503, "backend unavailable").is_transient());
        assert!(CoreError::http(429, "slow down").is_transient());
        assert!(!CoreError::http(400, "bad request").is_transient());
    }

    #[test]
    fn test_request_timeout_is_transient() {
        let err = CoreError::request_timeout("poll request timed out");
        assert!(err.is_transient());
        assert!(!err.is_not_found());
        assert!(!err.is_timeout()); // per-request timeout is not budget exhaustion
    }

    #[test]
    fn test_unclassified_preserves_source() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = CoreError::unclassified(io);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("pipe closed"));
    }

    #[test]
    fn test_failure_reason_codes_in_display() {
        let err = CoreError::OperationFailed {
            tracking_id: "op-9".into(),
            status_message: "gone".into(),
            reason: FailureReason::ResultNotFoundAfterSuccess,
        };
        assert!(err.to_string().contains("result-not-found-after-success"));
    }

    #[test]
    fn test_timeout_display_names_tracking_id() {
        let err = CoreError::OperationTimeout {
            tracking_id: "op-42".into(),
            waited: Duration::from_secs(300),
        };
        assert!(err.is_timeout());
        assert!(err.to_string().contains("op-42"));
    }
}
