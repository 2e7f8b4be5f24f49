//! Error types for the BVNK integration layer.

use bvnk_auth::AuthError;

/// Error type for configuration, operation building and webhook handling.
#[derive(Debug, thiserror::Error)]
pub enum BvnkError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An API operation was given invalid parameters.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Signing or verification failed.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Convenience result type for BVNK operations.
pub type BvnkResult<T> = Result<T, BvnkError>;
