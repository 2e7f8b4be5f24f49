//! BVNK API operations.
//!
//! Operations are turned into signed [`http::Request`] values. Sending them
//! is left to whatever HTTP client the caller uses.

use bvnk_auth::{Credential, HawkSigner, HttpMethod, OutboundRequest, RequestBody};
use http::HeaderValue;
use http::header::CONTENT_TYPE;
use tracing::debug;

use crate::config::BvnkConfig;
use crate::error::{BvnkError, BvnkResult};

/// Path of the wallet listing endpoint.
pub const WALLETS_PATH: &str = "/api/wallet";

const JSON: &str = "application/json";

/// An API call against the BVNK API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// `GET /api/wallet`.
    ListWallets,
    /// Any endpoint, with an optional JSON body.
    CustomApiCall {
        /// Request method.
        method: HttpMethod,
        /// Absolute path starting with `/`, optionally with a query.
        path: String,
        /// JSON request body; only an empty string means no body.
        body: Option<String>,
    },
}

impl Operation {
    /// Resolve the operation into an unsigned request against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`BvnkError::InvalidOperation`] if the path does not start with
    /// `/` or the body is not valid JSON, and [`BvnkError::Auth`] if the
    /// resulting URL is invalid.
    pub fn to_request(&self, base_url: &str) -> BvnkResult<OutboundRequest> {
        let base = base_url.trim_end_matches('/');
        match self {
            Self::ListWallets => {
                let request =
                    OutboundRequest::new(HttpMethod::Get, &format!("{base}{WALLETS_PATH}"))?
                        .with_header(CONTENT_TYPE, HeaderValue::from_static(JSON));
                Ok(request)
            }
            Self::CustomApiCall { method, path, body } => {
                if !path.starts_with('/') {
                    return Err(BvnkError::InvalidOperation(format!(
                        "API path must be specified and start with '/': {path:?}"
                    )));
                }
                let mut request = OutboundRequest::new(*method, &format!("{base}{path}"))?;
                if let Some(body) = body.as_deref().filter(|b| !b.is_empty()) {
                    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
                        BvnkError::InvalidOperation(format!("invalid JSON in request body: {e}"))
                    })?;
                    request = request
                        .with_header(CONTENT_TYPE, HeaderValue::from_static(JSON))
                        .with_body(RequestBody::Json(value));
                }
                Ok(request)
            }
        }
    }
}

/// Builds signed requests for the BVNK API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    credential: Credential,
    signer: HawkSigner,
}

impl ApiClient {
    /// Create a client from already validated parts.
    pub fn new(base_url: impl Into<String>, credential: Credential, signer: HawkSigner) -> Self {
        Self {
            base_url: base_url.into(),
            credential,
            signer,
        }
    }

    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the Hawk
    /// credential is incomplete.
    pub fn from_config(config: &BvnkConfig) -> BvnkResult<Self> {
        let credential = config.credential()?;
        Ok(Self::new(config.base_url.clone(), credential, config.signer()))
    }

    /// The API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve and sign an operation.
    ///
    /// # Errors
    ///
    /// See [`Operation::to_request`] and [`HawkSigner::sign`].
    pub fn prepare(&self, operation: &Operation) -> BvnkResult<OutboundRequest> {
        let request = operation.to_request(&self.base_url)?;
        debug!(
            method = %request.method(),
            url = %request.url(),
            "Signing BVNK API request"
        );
        Ok(self.signer.sign(&self.credential, request)?)
    }

    /// Resolve and sign an operation, producing a ready-to-send request.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::prepare`].
    pub fn build(&self, operation: &Operation) -> BvnkResult<http::Request<Vec<u8>>> {
        Ok(self.prepare(operation)?.into_http()?)
    }
}
