//! Error types for Hawk signing and verification.
//!
//! Every variant of [`AuthError`] is a caller-side precondition failure or a
//! Hawk header verification failure. Webhook rejections are not errors; they
//! are reported through [`crate::webhook::VerificationOutcome`].

/// Errors that can occur while signing or verifying requests.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    /// A signing or webhook secret is empty.
    #[error("Missing secret: {0}")]
    MissingSecret(&'static str),

    /// The Hawk key id is empty.
    #[error("Missing Hawk key id")]
    MissingKeyId,

    /// The Hawk key id contains characters that cannot appear inside a quoted attribute.
    #[error("Invalid Hawk key id: {0}")]
    InvalidKeyId(String),

    /// The request URL is not an absolute URL with a host.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    /// The HTTP method is not one of GET, POST, PUT, PATCH or DELETE.
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A nonce is empty or contains characters that would break the header or normalized string.
    #[error("Invalid nonce: {0:?}")]
    InvalidNonce(String),

    /// The `Authorization` header is not a well-formed Hawk header.
    #[error("Invalid Hawk Authorization header: {0}")]
    InvalidAuthHeader(String),

    /// A normalized string could not be parsed back into its fields.
    #[error("Invalid normalized string: {0}")]
    InvalidNormalizedString(String),

    /// The request body cannot be serialized for hashing.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// The Hawk header names a key id other than the credential's.
    #[error("Unknown Hawk key id: {0}")]
    UnknownKeyId(String),

    /// The Hawk MAC does not match the one computed locally.
    #[error("Hawk MAC does not match")]
    MacMismatch,

    /// The Hawk payload hash does not match the request body.
    #[error("Hawk payload hash does not match")]
    PayloadHashMismatch,

    /// The Hawk timestamp lies outside the accepted clock skew.
    #[error("Stale timestamp: {ts} is more than {skew}s away from {now}")]
    StaleTimestamp {
        /// Timestamp carried by the header.
        ts: u64,
        /// Local time when verifying.
        now: u64,
        /// Allowed skew in seconds.
        skew: u64,
    },
}
