//! Nonce generation for Hawk headers.
//!
//! [`RandomNonce`] draws from the thread-local CSPRNG, so concurrent signers
//! never share generator state. [`FixedNonce`] is for deterministic tests.

use rand::RngExt;

/// Smallest nonce size accepted, in random bytes.
pub const MIN_NONCE_BYTES: usize = 6;

/// Default nonce size, in random bytes.
pub const DEFAULT_NONCE_BYTES: usize = 12;

/// Source of single-use nonce tokens.
pub trait NonceSource: Send + Sync + std::fmt::Debug {
    /// Produce a fresh nonce token.
    fn nonce(&self) -> String;
}

/// Hex-encoded random bytes from a cryptographically secure generator.
///
/// # Examples
///
/// ```
/// use bvnk_auth::nonce::{NonceSource, RandomNonce};
///
/// let nonce = RandomNonce::default().nonce();
/// assert_eq!(nonce.len(), 24);
/// assert!(nonce.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RandomNonce {
    bytes: usize,
}

impl RandomNonce {
    /// Create a generator for `bytes` random bytes, raised to [`MIN_NONCE_BYTES`] if smaller.
    #[must_use]
    pub fn new(bytes: usize) -> Self {
        Self {
            bytes: bytes.max(MIN_NONCE_BYTES),
        }
    }

    /// Number of random bytes per nonce.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.bytes
    }
}

impl Default for RandomNonce {
    fn default() -> Self {
        Self::new(DEFAULT_NONCE_BYTES)
    }
}

impl NonceSource for RandomNonce {
    fn nonce(&self) -> String {
        let mut rng = rand::rng();
        let mut buf = vec![0u8; self.bytes];
        rng.fill(buf.as_mut_slice());
        hex::encode(buf)
    }
}

/// Always returns the same nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedNonce(pub String);

impl FixedNonce {
    /// Create a fixed nonce source.
    pub fn new(nonce: impl Into<String>) -> Self {
        Self(nonce.into())
    }
}

impl NonceSource for FixedNonce {
    fn nonce(&self) -> String {
        self.0.clone()
    }
}
