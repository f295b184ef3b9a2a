//! Error types for hosting-API operations.
//!
//! Errors are classified for retry logic: handlers catch every [`ApiError`]
//! at their own boundary and may retry transient failures once, so the
//! classification here decides whether a failure is worth that attempt.

use thiserror::Error;

/// Errors from outbound GitHub API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// GitHub returned a non-success status
    #[error("GitHub API error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Rate limit exhausted (429, or 403 with a zeroed remaining quota)
    #[error("GitHub API rate limited")]
    RateLimited,

    /// Optimistic-concurrency conflict: the prior blob SHA no longer matches
    #[error("update conflict for {path}: expected SHA is stale")]
    Conflict { path: String },

    /// The bounded request deadline elapsed; treated as failure, never success
    #[error("GitHub API request timed out")]
    Timeout,

    /// Connection-level failure before any response arrived
    #[error("network error: {message}")]
    Network { message: String },

    /// A response arrived but its body was not the documented shape
    #[error("unexpected response body: {message}")]
    UnexpectedBody { message: String },
}

impl ApiError {
    /// Check if this error represents a transient condition that may succeed
    /// if retried.
    ///
    /// Conflicts are not transient: the precondition must be re-read, and the
    /// idempotency pre-check will then decide whether the write still
    /// applies.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status >= 500,
            Self::RateLimited => true,
            Self::Conflict { .. } => false,
            Self::Timeout => true,
            Self::Network { .. } => true,
            Self::UnexpectedBody { .. } => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::UnexpectedBody {
                message: err.to_string(),
            }
        } else {
            Self::Network {
                message: err.to_string(),
            }
        }
    }
}

/// Errors from webhook signature header handling.
///
/// A signature that is well-formed but wrong is not an error; verification
/// returns `false` and the entry point rejects the request.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// Header is missing the scheme prefix or is not valid hex
    #[error("invalid signature format: {message}")]
    InvalidFormat { message: String },
}
