//! Configuration for the BVNK integration.
//!
//! All configuration is driven by environment variables. Values are
//! validated once, when a [`Credential`] or [`HawkSigner`] is derived from
//! them, so the engine never sees a half-configured credential.

use bvnk_auth::nonce::{DEFAULT_NONCE_BYTES, MIN_NONCE_BYTES};
use bvnk_auth::{Credential, HawkSigner, RandomNonce};
use http::Uri;
use http::header::HeaderName;

use crate::error::{BvnkError, BvnkResult};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.bvnk.com";

/// Default path the webhook sender signs.
pub const DEFAULT_WEBHOOK_PATH: &str = "/bvnk/webhook";

/// Global configuration for the BVNK integration.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BvnkConfig {
    /// Hawk key id.
    pub hawk_id: String,
    /// Hawk signing secret.
    pub hawk_secret: String,
    /// Whether outbound requests carry a payload hash.
    pub enable_payload_hashing: bool,
    /// Secret used to verify inbound webhooks.
    pub webhook_secret: String,
    /// API base URL.
    pub base_url: String,
    /// Path the webhook sender includes in its signature.
    pub webhook_path: String,
    /// Name of the header carrying the webhook signature.
    pub signature_header: String,
    /// Random bytes per nonce.
    pub nonce_bytes: usize,
    /// Log level.
    pub log_level: String,
}

impl std::fmt::Debug for BvnkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BvnkConfig")
            .field("hawk_id", &self.hawk_id)
            .field("hawk_secret", &"[REDACTED]")
            .field("enable_payload_hashing", &self.enable_payload_hashing)
            .field("webhook_secret", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("webhook_path", &self.webhook_path)
            .field("signature_header", &self.signature_header)
            .field("nonce_bytes", &self.nonce_bytes)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Default for BvnkConfig {
    fn default() -> Self {
        Self {
            hawk_id: String::new(),
            hawk_secret: String::new(),
            enable_payload_hashing: false,
            webhook_secret: String::new(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            webhook_path: DEFAULT_WEBHOOK_PATH.to_owned(),
            signature_header: bvnk_auth::webhook::SIGNATURE_HEADER.to_owned(),
            nonce_bytes: DEFAULT_NONCE_BYTES,
            log_level: "info".to_owned(),
        }
    }
}

impl BvnkConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`BvnkError::Config`] if `BVNK_NONCE_BYTES` is not an integer.
    pub fn from_env() -> BvnkResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`BvnkError::Config`] if `BVNK_NONCE_BYTES` is not an integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> BvnkResult<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("BVNK_HAWK_ID") {
            config.hawk_id = v;
        }
        if let Some(v) = lookup("BVNK_HAWK_SECRET") {
            config.hawk_secret = v;
        }
        if let Some(v) = lookup("BVNK_ENABLE_PAYLOAD_HASHING") {
            config.enable_payload_hashing = v == "1" || v.eq_ignore_ascii_case("true");
        }
        if let Some(v) = lookup("BVNK_WEBHOOK_SECRET") {
            config.webhook_secret = v;
        }
        if let Some(v) = lookup("BVNK_BASE_URL").filter(|v| !v.is_empty()) {
            config.base_url = v;
        }
        if let Some(v) = lookup("BVNK_WEBHOOK_PATH").filter(|v| !v.is_empty()) {
            config.webhook_path = v;
        }
        if let Some(v) = lookup("BVNK_SIGNATURE_HEADER").filter(|v| !v.is_empty()) {
            config.signature_header = v;
        }
        if let Some(v) = lookup("BVNK_NONCE_BYTES") {
            config.nonce_bytes = v
                .trim()
                .parse()
                .map_err(|_| BvnkError::Config(format!("BVNK_NONCE_BYTES is not an integer: {v}")))?;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }

        Ok(config)
    }

    /// Check the non-secret settings.
    ///
    /// # Errors
    ///
    /// Returns [`BvnkError::Config`] naming the first invalid setting.
    pub fn validate(&self) -> BvnkResult<()> {
        let base: Uri = self
            .base_url
            .parse()
            .map_err(|e| BvnkError::Config(format!("invalid base URL {}: {e}", self.base_url)))?;
        if !matches!(base.scheme_str(), Some("http" | "https")) || base.host().is_none() {
            return Err(BvnkError::Config(format!(
                "base URL must be an absolute http(s) URL: {}",
                self.base_url
            )));
        }
        if !self.webhook_path.starts_with('/') {
            return Err(BvnkError::Config(format!(
                "webhook path must start with '/': {}",
                self.webhook_path
            )));
        }
        if self.nonce_bytes < MIN_NONCE_BYTES {
            return Err(BvnkError::Config(format!(
                "nonce size {} is below the minimum of {MIN_NONCE_BYTES} bytes",
                self.nonce_bytes
            )));
        }
        self.signature_header_name()?;
        Ok(())
    }

    /// The signature header as a typed header name.
    ///
    /// # Errors
    ///
    /// Returns [`BvnkError::Config`] if the name is not a valid header name.
    pub fn signature_header_name(&self) -> BvnkResult<HeaderName> {
        HeaderName::from_bytes(self.signature_header.as_bytes()).map_err(|_| {
            BvnkError::Config(format!(
                "invalid signature header name: {}",
                self.signature_header
            ))
        })
    }

    /// Build the credential handed to the signer and verifier.
    ///
    /// # Errors
    ///
    /// Returns [`BvnkError::Config`] for invalid settings and
    /// [`BvnkError::Auth`] if the Hawk id or secret is missing or malformed.
    pub fn credential(&self) -> BvnkResult<Credential> {
        self.validate()?;
        let credential = Credential::new(self.hawk_id.clone(), self.hawk_secret.clone())
            .with_payload_hashing(self.enable_payload_hashing)
            .with_webhook_secret(self.webhook_secret.clone());
        credential.validate_for_signing()?;
        Ok(credential)
    }

    /// A signer using the system clock and the configured nonce size.
    #[must_use]
    pub fn signer(&self) -> HawkSigner {
        HawkSigner::default().with_nonce_source(RandomNonce::new(self.nonce_bytes))
    }
}
