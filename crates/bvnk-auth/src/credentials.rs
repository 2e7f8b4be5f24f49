//! Credential model and lookup.
//!
//! A [`Credential`] is supplied by the caller for the duration of one signing
//! or verification call and is never persisted by this crate. The Hawk signing
//! secret and the webhook secret are independent keys.
//!
//! [`CredentialProvider`] resolves a credential from a Hawk key id on the
//! receiving side of the outbound scheme.

use std::collections::HashMap;
use std::fmt;

use crate::error::AuthError;

/// Opaque secret key bytes. The `Debug` output never reveals the key.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Create a secret key from raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether the key is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey([REDACTED; {}])", self.0.len())
    }
}

impl From<&str> for SecretKey {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<String> for SecretKey {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

impl From<Vec<u8>> for SecretKey {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

/// Shared-secret credential for one API account.
///
/// # Examples
///
/// ```
/// use bvnk_auth::Credential;
///
/// let credential = Credential::new("key-id", "s3cr3t")
///     .with_payload_hashing(true)
///     .with_webhook_secret("whsec");
/// assert!(credential.validate_for_signing().is_ok());
/// assert!(credential.payload_hashing());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    id: String,
    secret: SecretKey,
    payload_hashing: bool,
    webhook_secret: SecretKey,
}

impl Credential {
    /// Create a credential with payload hashing disabled and no webhook secret.
    pub fn new(id: impl Into<String>, secret: impl Into<SecretKey>) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
            payload_hashing: false,
            webhook_secret: SecretKey::default(),
        }
    }

    /// Enable or disable Hawk payload hashing.
    #[must_use]
    pub fn with_payload_hashing(mut self, enabled: bool) -> Self {
        self.payload_hashing = enabled;
        self
    }

    /// Set the key used to verify inbound webhooks.
    #[must_use]
    pub fn with_webhook_secret(mut self, secret: impl Into<SecretKey>) -> Self {
        self.webhook_secret = secret.into();
        self
    }

    /// The Hawk key id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The Hawk signing secret.
    #[must_use]
    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    /// Whether outbound requests carry a payload hash.
    #[must_use]
    pub fn payload_hashing(&self) -> bool {
        self.payload_hashing
    }

    /// The webhook secret, which may be empty when only signing is needed.
    #[must_use]
    pub fn webhook_secret(&self) -> &SecretKey {
        &self.webhook_secret
    }

    /// Check the fields the Hawk signer depends on.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingKeyId`] or [`AuthError::InvalidKeyId`] for
    /// a bad key id, and [`AuthError::MissingSecret`] for an empty secret.
    pub fn validate_for_signing(&self) -> Result<(), AuthError> {
        if self.id.is_empty() {
            return Err(AuthError::MissingKeyId);
        }
        // The id is emitted inside a quoted header attribute.
        if self
            .id
            .chars()
            .any(|c| c == '"' || c == '\\' || c.is_control())
        {
            return Err(AuthError::InvalidKeyId(self.id.clone()));
        }
        if self.secret.is_empty() {
            return Err(AuthError::MissingSecret("hawk secret"));
        }
        Ok(())
    }

    /// The webhook secret, or an error when none was configured.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingSecret`] if the webhook secret is empty.
    pub fn webhook_key(&self) -> Result<&[u8], AuthError> {
        if self.webhook_secret.is_empty() {
            return Err(AuthError::MissingSecret("webhook secret"));
        }
        Ok(self.webhook_secret.as_bytes())
    }
}

/// Trait for looking up Hawk credentials by key id.
pub trait CredentialProvider: Send + Sync {
    /// Retrieve the credential for the given key id.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnknownKeyId`] if the id is not recognized.
    fn get_credential(&self, id: &str) -> Result<Credential, AuthError>;
}

/// In-memory credential provider keyed by Hawk id.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialProvider {
    credentials: HashMap<String, Credential>,
}

impl StaticCredentialProvider {
    /// Create a provider from a list of credentials, keyed by their ids.
    pub fn new(credentials: impl IntoIterator<Item = Credential>) -> Self {
        Self {
            credentials: credentials
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect(),
        }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn get_credential(&self, id: &str) -> Result<Credential, AuthError> {
        self.credentials
            .get(id)
            .cloned()
            .ok_or_else(|| AuthError::UnknownKeyId(id.to_owned()))
    }
}
