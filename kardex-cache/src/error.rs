//! Backend error taxonomy
//!
//! Fetch outcomes are recorded on cache entries, so the error type lives
//! beside the cache. Errors are cloneable because a shared in-flight fetch
//! hands the same result to every attached caller.

use thiserror::Error;

/// Failure of a backend gateway call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The backend was unreachable or timed out; retried, then surfaced
    #[error("backend transport failure: {0}")]
    Transport(String),

    /// The referenced entity does not exist; surfaced immediately
    #[error("not found: {0}")]
    NotFound(String),

    /// The entity was rejected on save; surfaced immediately
    #[error("validation failed: {0}")]
    Validation(String),
}

impl GatewayError {
    /// Only transport failures are worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Transport(_))
    }
}
