//! Hawk header authentication for outbound API requests.
//!
//! The signer stamps each request with a fresh timestamp and nonce, computes
//! `HMAC-SHA256(secret, normalized_string)` and attaches:
//!
//! ```text
//! Hawk id="<id>", ts="<unix-seconds>", nonce="<token>", mac="<base64>"[, hash="<base64>"]
//! ```
//!
//! [`verify_authorization`] performs the reverse check and is used by mock
//! servers and self-tests. It is stateless and does not track seen nonces.

use std::fmt;
use std::sync::Arc;

use http::HeaderValue;
use tracing::debug;

use crate::canonical::HawkArtifacts;
use crate::clock::{Clock, SystemClock};
use crate::credentials::{Credential, CredentialProvider, SecretKey};
use crate::error::AuthError;
use crate::mac::{PayloadHasher, Sha256Hasher, constant_time_eq, mac_base64};
use crate::nonce::{NonceSource, RandomNonce};
use crate::request::{OutboundRequest, RequestBody};

/// Authentication scheme name.
pub const HAWK_SCHEME: &str = "Hawk";

/// Default tolerated difference between a header timestamp and local time.
pub const DEFAULT_TIMESTAMP_SKEW_SECS: u64 = 60;

/// Parsed attributes of a Hawk `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HawkHeader {
    /// Key id.
    pub id: String,
    /// Timestamp in Unix seconds.
    pub ts: u64,
    /// Nonce token.
    pub nonce: String,
    /// Base64 MAC over the normalized string.
    pub mac: String,
    /// Base64 payload hash, present only when payload hashing is enabled.
    pub hash: Option<String>,
}

impl fmt::Display for HawkHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{HAWK_SCHEME} id=\"{}\", ts=\"{}\", nonce=\"{}\", mac=\"{}\"",
            self.id, self.ts, self.nonce, self.mac
        )?;
        if let Some(hash) = &self.hash {
            write!(f, ", hash=\"{hash}\"")?;
        }
        Ok(())
    }
}

/// Parse a Hawk `Authorization` header value.
///
/// # Errors
///
/// Returns [`AuthError::InvalidAuthHeader`] if the scheme is not `Hawk`, an
/// attribute is malformed, unknown or repeated, or a required attribute is
/// missing.
///
/// # Examples
///
/// ```
/// use bvnk_auth::hawk::parse_authorization_header;
///
/// let header = parse_authorization_header(
///     r#"Hawk id="dh37fgj492je", ts="1353832234", nonce="j4h3g2", mac="6R4rV5iE+NPoym+WwjeHzjAGXUtLNIxmo1vpMofpLAE=""#,
/// )
/// .unwrap();
/// assert_eq!(header.id, "dh37fgj492je");
/// assert_eq!(header.ts, 1_353_832_234);
/// assert!(header.hash.is_none());
/// ```
pub fn parse_authorization_header(value: &str) -> Result<HawkHeader, AuthError> {
    let invalid = |msg: &str| AuthError::InvalidAuthHeader(msg.to_owned());

    let (scheme, mut rest) = value.split_once(' ').ok_or_else(|| invalid("missing scheme"))?;
    if !scheme.eq_ignore_ascii_case(HAWK_SCHEME) {
        return Err(invalid("scheme is not Hawk"));
    }

    let mut id = None;
    let mut ts = None;
    let mut nonce = None;
    let mut mac = None;
    let mut hash = None;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let (key, after_key) = rest
            .split_once("=\"")
            .ok_or_else(|| invalid("expected key=\"value\""))?;
        let (attr, after_value) = after_key
            .split_once('"')
            .ok_or_else(|| invalid("unterminated attribute value"))?;

        let slot = match key.trim() {
            "id" => &mut id,
            "ts" => &mut ts,
            "nonce" => &mut nonce,
            "mac" => &mut mac,
            "hash" => &mut hash,
            other => {
                return Err(AuthError::InvalidAuthHeader(format!(
                    "unsupported attribute {other}"
                )));
            }
        };
        if slot.replace(attr).is_some() {
            return Err(AuthError::InvalidAuthHeader(format!(
                "duplicate attribute {}",
                key.trim()
            )));
        }

        rest = after_value.trim_start();
        if let Some(next) = rest.strip_prefix(',') {
            rest = next;
        } else if !rest.is_empty() {
            return Err(invalid("attributes must be comma separated"));
        }
    }

    let ts: u64 = ts
        .ok_or_else(|| invalid("missing ts"))?
        .parse()
        .map_err(|_| invalid("ts is not an integer"))?;

    Ok(HawkHeader {
        id: id.ok_or_else(|| invalid("missing id"))?.to_owned(),
        ts,
        nonce: nonce.ok_or_else(|| invalid("missing nonce"))?.to_owned(),
        mac: mac.ok_or_else(|| invalid("missing mac"))?.to_owned(),
        hash: hash.map(ToOwned::to_owned),
    })
}

/// Compute the base64 Hawk MAC of the artifacts under `secret`.
#[must_use]
pub fn compute_mac(secret: &SecretKey, artifacts: &HawkArtifacts) -> String {
    mac_base64(secret.as_bytes(), artifacts.normalized_string().as_bytes())
}

/// Hash a request body with the given hasher.
///
/// # Errors
///
/// Returns [`AuthError::InvalidPayload`] if the body cannot be serialized.
pub fn payload_hash(hasher: &dyn PayloadHasher, body: &RequestBody) -> Result<String, AuthError> {
    Ok(hasher.hash(&body.to_bytes()?))
}

/// Outbound request signer.
///
/// Holds the clock, nonce source and payload hasher; carries no per-request
/// state, so one signer may be shared across threads.
///
/// # Examples
///
/// ```
/// use bvnk_auth::{Credential, FixedClock, FixedNonce, HawkSigner, HttpMethod, OutboundRequest};
///
/// let signer = HawkSigner::default()
///     .with_clock(FixedClock(1_700_000_000))
///     .with_nonce_source(FixedNonce::new("abc123"));
/// let credential = Credential::new("my-id", "s3cr3t");
/// let request = OutboundRequest::new(HttpMethod::Get, "https://api.example.com/api/wallet").unwrap();
///
/// let signed = signer.sign(&credential, request).unwrap();
/// assert_eq!(
///     signed.authorization().unwrap(),
///     r#"Hawk id="my-id", ts="1700000000", nonce="abc123", mac="8Ho1UG9X76osjcUor3LqO8iOUHpMVI8pcBzC7oFRQvg=""#
/// );
/// ```
#[derive(Debug, Clone)]
pub struct HawkSigner {
    clock: Arc<dyn Clock>,
    nonces: Arc<dyn NonceSource>,
    hasher: Arc<dyn PayloadHasher>,
}

impl Default for HawkSigner {
    fn default() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            nonces: Arc::new(RandomNonce::default()),
            hasher: Arc::new(Sha256Hasher),
        }
    }
}

impl HawkSigner {
    /// Create a signer from explicit capabilities.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        nonces: Arc<dyn NonceSource>,
        hasher: Arc<dyn PayloadHasher>,
    ) -> Self {
        Self {
            clock,
            nonces,
            hasher,
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replace the nonce source.
    #[must_use]
    pub fn with_nonce_source(mut self, nonces: impl NonceSource + 'static) -> Self {
        self.nonces = Arc::new(nonces);
        self
    }

    /// Replace the payload hasher.
    #[must_use]
    pub fn with_hasher(mut self, hasher: impl PayloadHasher + 'static) -> Self {
        self.hasher = Arc::new(hasher);
        self
    }

    /// Compute the Hawk header for `request` without modifying it.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the credential is incomplete, the nonce
    /// source yields an unusable token, or the body cannot be serialized.
    pub fn authorization(
        &self,
        credential: &Credential,
        request: &OutboundRequest,
    ) -> Result<HawkHeader, AuthError> {
        credential.validate_for_signing()?;

        let ts = self.clock.now_unix();
        let nonce = self.nonces.nonce();
        validate_nonce(&nonce)?;

        let hash = if credential.payload_hashing() {
            Some(payload_hash(self.hasher.as_ref(), request.body())?)
        } else {
            None
        };

        let artifacts = HawkArtifacts::from_request(request, ts, nonce, hash);

        debug!(
            id = credential.id(),
            ts,
            nonce = %artifacts.nonce,
            method = %artifacts.method,
            resource = %artifacts.resource,
            hashed = artifacts.hash.is_some(),
            "Signing request with Hawk"
        );

        let mac = compute_mac(credential.secret(), &artifacts);

        Ok(HawkHeader {
            id: credential.id().to_owned(),
            ts: artifacts.timestamp,
            nonce: artifacts.nonce,
            mac,
            hash: artifacts.hash,
        })
    }

    /// Sign `request`, returning it with the `Authorization` header set.
    ///
    /// Method, URL and body are left untouched.
    ///
    /// # Errors
    ///
    /// See [`HawkSigner::authorization`]; additionally returns
    /// [`AuthError::InvalidAuthHeader`] if the header is not a valid HTTP
    /// header value (for example a non-ASCII key id).
    pub fn sign(
        &self,
        credential: &Credential,
        mut request: OutboundRequest,
    ) -> Result<OutboundRequest, AuthError> {
        let header = self.authorization(credential, &request)?;
        let value = HeaderValue::from_str(&header.to_string())
            .map_err(|e| AuthError::InvalidAuthHeader(e.to_string()))?;
        request.set_authorization(value);
        Ok(request)
    }
}

/// Verify the Hawk `Authorization` header of a request.
///
/// 1. Parses the header and resolves the credential by key id
/// 2. Rebuilds the normalized string from the request and the header's ts, nonce and hash
/// 3. Compares MACs in constant time
/// 4. Checks the payload hash against the body when present or required
/// 5. Rejects timestamps more than `skew_secs` away from `clock`
///
/// # Errors
///
/// Returns an [`AuthError`] describing the first failed check.
pub fn verify_authorization(
    request: &OutboundRequest,
    credential_provider: &dyn CredentialProvider,
    clock: &dyn Clock,
    skew_secs: u64,
) -> Result<HawkHeader, AuthError> {
    let value = request
        .authorization()
        .ok_or_else(|| AuthError::InvalidAuthHeader("missing Authorization header".to_owned()))?;
    let header = parse_authorization_header(value)?;
    let credential = credential_provider.get_credential(&header.id)?;

    let artifacts =
        HawkArtifacts::from_request(request, header.ts, header.nonce.clone(), header.hash.clone());
    let expected = compute_mac(credential.secret(), &artifacts);

    if !constant_time_eq(&header.mac, &expected) {
        debug!(id = %header.id, "Hawk MAC mismatch");
        return Err(AuthError::MacMismatch);
    }

    match &header.hash {
        Some(provided) => {
            let computed = payload_hash(&Sha256Hasher, request.body())?;
            if !constant_time_eq(provided, &computed) {
                debug!(id = %header.id, "Hawk payload hash mismatch");
                return Err(AuthError::PayloadHashMismatch);
            }
        }
        None if credential.payload_hashing() => {
            debug!(id = %header.id, "Hawk payload hash required but absent");
            return Err(AuthError::PayloadHashMismatch);
        }
        None => {}
    }

    let now = clock.now_unix();
    if now.abs_diff(header.ts) > skew_secs {
        return Err(AuthError::StaleTimestamp {
            ts: header.ts,
            now,
            skew: skew_secs,
        });
    }

    debug!(id = %header.id, "Hawk verification succeeded");
    Ok(header)
}

fn validate_nonce(nonce: &str) -> Result<(), AuthError> {
    if nonce.is_empty()
        || nonce
            .chars()
            .any(|c| c == '"' || c == '\\' || c == ',' || c.is_whitespace() || c.is_control())
    {
        return Err(AuthError::InvalidNonce(nonce.to_owned()));
    }
    Ok(())
}
