//! Canonical string construction for both signing directions.
//!
//! Outbound Hawk requests use the newline-delimited normalized string:
//!
//! ```text
//! hawk.1.header\n
//! <timestamp>\n
//! <nonce>\n
//! <METHOD>\n
//! <path>[?<query>]\n
//! <host>\n
//! <port>\n
//! <payload hash or empty>\n
//! \n
//! ```
//!
//! Inbound webhooks use a plain concatenation of the webhook path, the
//! content type and the raw body bytes, with no delimiter.

use http::Uri;

use crate::error::AuthError;
use crate::request::{HttpMethod, OutboundRequest};

/// First line of every Hawk header normalized string.
pub const HAWK_HEADER_PREFIX: &str = "hawk.1.header";

/// Number of `\n`-separated segments in a normalized string, counting the
/// empty ext line and the empty segment after the final newline.
const NORMALIZED_SEGMENTS: usize = 10;

/// The request attributes covered by a Hawk MAC.
///
/// Built fresh for every signature; the timestamp and nonce are never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HawkArtifacts {
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    /// Single-use token.
    pub nonce: String,
    /// Request method.
    pub method: HttpMethod,
    /// Path, plus `?query` when the URL has a non-empty query.
    pub resource: String,
    /// Lower-cased host name.
    pub host: String,
    /// Explicit port, or the scheme default.
    pub port: u16,
    /// Base64 payload hash when payload hashing is enabled.
    pub hash: Option<String>,
}

impl HawkArtifacts {
    /// Collect the covered attributes of `request`.
    #[must_use]
    pub fn from_request(
        request: &OutboundRequest,
        timestamp: u64,
        nonce: impl Into<String>,
        hash: Option<String>,
    ) -> Self {
        let url = request.url();
        Self {
            timestamp,
            nonce: nonce.into(),
            method: request.method(),
            resource: build_resource(url),
            host: url.host().unwrap_or_default().to_ascii_lowercase(),
            port: resolve_port(url),
            hash,
        }
    }

    /// Build the normalized string that the MAC is computed over.
    ///
    /// # Examples
    ///
    /// ```
    /// use bvnk_auth::{HawkArtifacts, HttpMethod};
    ///
    /// let artifacts = HawkArtifacts {
    ///     timestamp: 1_700_000_000,
    ///     nonce: "abc123".to_owned(),
    ///     method: HttpMethod::Get,
    ///     resource: "/api/wallet".to_owned(),
    ///     host: "api.example.com".to_owned(),
    ///     port: 443,
    ///     hash: None,
    /// };
    /// assert_eq!(
    ///     artifacts.normalized_string(),
    ///     "hawk.1.header\n1700000000\nabc123\nGET\n/api/wallet\napi.example.com\n443\n\n\n"
    /// );
    /// ```
    #[must_use]
    pub fn normalized_string(&self) -> String {
        let hash = self.hash.as_deref().unwrap_or("");
        format!(
            "{HAWK_HEADER_PREFIX}\n{}\n{}\n{}\n{}\n{}\n{}\n{hash}\n\n",
            self.timestamp,
            self.nonce,
            self.method.as_str(),
            self.resource,
            self.host,
            self.port,
        )
    }

    /// Recover the artifacts from a normalized string.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidNormalizedString`] if the layout, prefix,
    /// timestamp, method or port is invalid, and
    /// [`AuthError::UnsupportedMethod`] for an unknown method.
    pub fn parse(normalized: &str) -> Result<Self, AuthError> {
        let segments: Vec<&str> = normalized.split('\n').collect();
        if segments.len() != NORMALIZED_SEGMENTS {
            return Err(AuthError::InvalidNormalizedString(format!(
                "expected {NORMALIZED_SEGMENTS} segments, found {}",
                segments.len()
            )));
        }
        if segments[0] != HAWK_HEADER_PREFIX {
            return Err(AuthError::InvalidNormalizedString(format!(
                "unexpected prefix {}",
                segments[0]
            )));
        }
        if !segments[8].is_empty() || !segments[9].is_empty() {
            return Err(AuthError::InvalidNormalizedString(
                "missing blank terminator line".to_owned(),
            ));
        }

        let timestamp = segments[1].parse().map_err(|_| {
            AuthError::InvalidNormalizedString(format!("invalid timestamp {}", segments[1]))
        })?;
        let port = segments[6].parse().map_err(|_| {
            AuthError::InvalidNormalizedString(format!("invalid port {}", segments[6]))
        })?;
        let hash = Some(segments[7])
            .filter(|h| !h.is_empty())
            .map(ToOwned::to_owned);

        Ok(Self {
            timestamp,
            nonce: segments[2].to_owned(),
            method: segments[3].parse()?,
            resource: segments[4].to_owned(),
            host: segments[5].to_owned(),
            port,
            hash,
        })
    }
}

/// Path and query of a URL as covered by the MAC.
///
/// An empty path becomes `/`; `?query` is appended only when the query is non-empty.
///
/// # Examples
///
/// ```
/// use bvnk_auth::canonical::build_resource;
///
/// assert_eq!(build_resource(&"https://a.com/x?y=1".parse().unwrap()), "/x?y=1");
/// assert_eq!(build_resource(&"https://a.com/x?".parse().unwrap()), "/x");
/// assert_eq!(build_resource(&"https://a.com".parse().unwrap()), "/");
/// ```
#[must_use]
pub fn build_resource(url: &Uri) -> String {
    let path = match url.path() {
        "" => "/",
        p => p,
    };
    match url.query() {
        Some(query) if !query.is_empty() => format!("{path}?{query}"),
        _ => path.to_owned(),
    }
}

/// The URL's explicit port, or 443 for `https` and 80 otherwise.
#[must_use]
pub fn resolve_port(url: &Uri) -> u16 {
    url.port_u16().unwrap_or_else(|| {
        if url.scheme_str() == Some("https") {
            443
        } else {
            80
        }
    })
}

/// Build the byte string a webhook signature covers: `path + content_type + raw_body`.
///
/// The raw body is used exactly as received; it is never re-serialized.
#[must_use]
pub fn build_webhook_string(path: &str, content_type: &str, raw_body: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(path.len() + content_type.len() + raw_body.len());
    buf.extend_from_slice(path.as_bytes());
    buf.extend_from_slice(content_type.as_bytes());
    buf.extend_from_slice(raw_body);
    buf
}
