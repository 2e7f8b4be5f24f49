//! HMAC-SHA256 and SHA-256 primitives.
//!
//! Outbound Hawk MACs and payload hashes are base64 encoded; inbound webhook
//! signatures are lowercase hex. Both directions share [`hmac_sha256`].

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, KeyInit, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Length in bytes of every digest produced here.
pub const DIGEST_LEN: usize = 32;

/// Compute HMAC-SHA256 and return the raw bytes.
#[must_use]
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Compute HMAC-SHA256 and return it base64 encoded (Hawk `mac` attribute).
#[must_use]
pub fn mac_base64(key: &[u8], data: &[u8]) -> String {
    BASE64.encode(hmac_sha256(key, data))
}

/// Compute HMAC-SHA256 and return it as lowercase hex (webhook signature).
///
/// # Examples
///
/// ```
/// use bvnk_auth::mac::mac_hex;
///
/// let sig = mac_hex(b"key", b"data");
/// assert_eq!(sig.len(), 64);
/// assert!(sig.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
/// ```
#[must_use]
pub fn mac_hex(key: &[u8], data: &[u8]) -> String {
    hex::encode(hmac_sha256(key, data))
}

/// Compute the SHA-256 of a payload and return it base64 encoded.
///
/// # Examples
///
/// ```
/// use bvnk_auth::mac::hash_payload;
///
/// assert_eq!(hash_payload(b""), "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=");
/// ```
#[must_use]
pub fn hash_payload(payload: &[u8]) -> String {
    BASE64.encode(Sha256::digest(payload))
}

/// Compare two encoded digests without short-circuiting on the first differing byte.
#[must_use]
pub fn constant_time_eq(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Source of Hawk payload hashes.
///
/// The signer calls this instead of hashing directly so tests can substitute
/// a fixed digest.
pub trait PayloadHasher: Send + Sync + std::fmt::Debug {
    /// Hash the payload bytes into the encoded form placed in the normalized string.
    fn hash(&self, payload: &[u8]) -> String;
}

/// SHA-256, base64 encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl PayloadHasher for Sha256Hasher {
    fn hash(&self, payload: &[u8]) -> String {
        hash_payload(payload)
    }
}
