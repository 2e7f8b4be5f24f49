//! Inbound webhook signature verification.
//!
//! The sender signs `path + content_type + raw_body` with HMAC-SHA256 under the
//! webhook secret and delivers the lowercase hex digest in a request header.
//! Verification recomputes the digest over the exact received bytes and
//! compares it in constant time.
//!
//! A verification call moves through `Received -> Rejected | Accepted` with no
//! intermediate state. Rejections are values, not errors; only a missing
//! webhook secret (a configuration bug) is reported as an [`AuthError`].

use std::fmt;

use http::header::{CONTENT_TYPE, HeaderName};
use serde_json::{Map, Value};
use tracing::debug;

use crate::canonical::build_webhook_string;
use crate::credentials::Credential;
use crate::error::AuthError;
use crate::mac::{constant_time_eq, mac_hex};

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Content type assumed when the request carries none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// A received webhook call, consumed by exactly one [`verify`].
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    path: String,
    content_type: String,
    raw_body: Vec<u8>,
    signature: Option<String>,
    fields: Map<String, Value>,
}

impl WebhookEvent {
    /// Create an event from its parts.
    ///
    /// An empty `content_type` falls back to [`DEFAULT_CONTENT_TYPE`] and an
    /// empty signature counts as absent. A JSON object body populates the
    /// parsed fields; any other body leaves them empty.
    pub fn new(
        path: impl Into<String>,
        content_type: impl Into<String>,
        raw_body: impl Into<Vec<u8>>,
        signature: Option<String>,
    ) -> Self {
        let content_type = Some(content_type.into())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_owned());
        let raw_body = raw_body.into();
        let fields = match serde_json::from_slice(&raw_body) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Self {
            path: path.into(),
            content_type,
            raw_body,
            signature: signature.filter(|s| !s.is_empty()),
            fields,
        }
    }

    /// Build an event from received request parts.
    ///
    /// `path` is the path the sender signed (the configured webhook path),
    /// which may differ from the path the request was routed on.
    /// Header lookup is case-insensitive. A signature header that is not
    /// visible ASCII still counts as delivered and can never match.
    pub fn from_parts(
        parts: &http::request::Parts,
        raw_body: impl Into<Vec<u8>>,
        path: &str,
        signature_header: &HeaderName,
    ) -> Self {
        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let signature = parts
            .headers
            .get(signature_header)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
        Self::new(path, content_type, raw_body, signature)
    }

    /// The signed path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The content type used for signing.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The raw body bytes as received.
    #[must_use]
    pub fn raw_body(&self) -> &[u8] {
        &self.raw_body
    }

    /// The delivered signature, if any.
    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Fields parsed from a JSON object body.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Why a webhook was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// No signature header was delivered.
    MissingSignature,
    /// The delivered signature does not match the computed one.
    SignatureMismatch,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingSignature => "missing signature",
            Self::SignatureMismatch => "signature mismatch",
        })
    }
}

/// Result of verifying one webhook.
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationOutcome {
    /// The webhook is authentic; carries its parsed fields unmodified.
    Accepted(Map<String, Value>),
    /// The webhook must be dropped.
    Rejected(RejectionReason),
}

impl VerificationOutcome {
    /// Whether the webhook was accepted.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Compute the lowercase hex signature a sender attaches to a webhook.
///
/// # Examples
///
/// ```
/// use bvnk_auth::webhook::sign_webhook;
///
/// let sig = sign_webhook(
///     b"whsec",
///     "/bvnk/webhook",
///     "application/json",
///     br#"{"source":"payment","event":"statusChanged"}"#,
/// );
/// assert_eq!(sig, "d719d2ada1c87a83b62e896aa3cce30693fdab055c70c6d87f4ea4fcc481ead3");
/// ```
#[must_use]
pub fn sign_webhook(secret: &[u8], path: &str, content_type: &str, raw_body: &[u8]) -> String {
    mac_hex(secret, &build_webhook_string(path, content_type, raw_body))
}

/// Verify a received webhook against the credential's webhook secret.
///
/// A missing signature is rejected before any computation. Otherwise the
/// expected signature is computed over the raw body and compared exactly
/// (no case folding) in constant time.
///
/// # Errors
///
/// Returns [`AuthError::MissingSecret`] if the credential has no webhook secret.
pub fn verify(
    credential: &Credential,
    event: WebhookEvent,
) -> Result<VerificationOutcome, AuthError> {
    let Some(provided) = event.signature.as_deref() else {
        debug!(path = %event.path, "Webhook has no signature");
        return Ok(VerificationOutcome::Rejected(
            RejectionReason::MissingSignature,
        ));
    };

    let key = credential.webhook_key()?;
    let expected = sign_webhook(key, &event.path, &event.content_type, &event.raw_body);

    if constant_time_eq(provided, &expected) {
        debug!(path = %event.path, "Webhook signature verified");
        Ok(VerificationOutcome::Accepted(event.fields))
    } else {
        debug!(
            path = %event.path,
            content_type = %event.content_type,
            provided_len = provided.len(),
            "Webhook signature mismatch"
        );
        Ok(VerificationOutcome::Rejected(
            RejectionReason::SignatureMismatch,
        ))
    }
}
