//! Outbound request model.
//!
//! The signer reads method, URL and body and adds exactly one header
//! (`Authorization`). [`RequestBody::to_bytes`] defines the bytes that are both
//! hashed and sent, so a payload hash always matches the wire body.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use http::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use http::Uri;

use crate::error::AuthError;

/// HTTP methods accepted by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    /// `GET`
    #[default]
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case method name as it appears in the normalized string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Whether requests with this method conventionally carry no body.
    #[must_use]
    pub fn is_bodyless(self) -> bool {
        matches!(self, Self::Get | Self::Delete)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            _ => Err(AuthError::UnsupportedMethod(s.to_owned())),
        }
    }
}

impl TryFrom<&http::Method> for HttpMethod {
    type Error = AuthError;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

impl From<HttpMethod> for http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Patch => Self::PATCH,
            HttpMethod::Delete => Self::DELETE,
        }
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    /// No body; hashes as the empty string.
    #[default]
    Empty,
    /// Raw bytes, hashed as-is.
    Bytes(Vec<u8>),
    /// Text, hashed as its UTF-8 bytes.
    Text(String),
    /// Structured JSON, hashed as its compact serialization.
    Json(serde_json::Value),
}

impl RequestBody {
    /// The exact bytes hashed and transmitted for this body.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidPayload`] if a JSON body cannot be serialized.
    pub fn to_bytes(&self) -> Result<Cow<'_, [u8]>, AuthError> {
        match self {
            Self::Empty => Ok(Cow::Borrowed(&[])),
            Self::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
            Self::Text(text) => Ok(Cow::Borrowed(text.as_bytes())),
            Self::Json(value) => serde_json::to_vec(value)
                .map(Cow::Owned)
                .map_err(|e| AuthError::InvalidPayload(e.to_string())),
        }
    }

    /// Whether this is [`RequestBody::Empty`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// A request about to be dispatched to the remote API.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    method: HttpMethod,
    url: Uri,
    headers: HeaderMap,
    body: RequestBody,
}

impl OutboundRequest {
    /// Create a request for an absolute `http` or `https` URL.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidUrl`] if the URL does not parse or lacks a
    /// scheme or host.
    ///
    /// # Examples
    ///
    /// ```
    /// use bvnk_auth::{HttpMethod, OutboundRequest};
    ///
    /// let request = OutboundRequest::new(HttpMethod::Get, "https://api.example.com/api/wallet").unwrap();
    /// assert_eq!(request.url().path(), "/api/wallet");
    /// assert!(OutboundRequest::new(HttpMethod::Get, "/relative/only").is_err());
    /// ```
    pub fn new(method: HttpMethod, url: &str) -> Result<Self, AuthError> {
        let url: Uri = url
            .parse()
            .map_err(|e: http::uri::InvalidUri| AuthError::InvalidUrl(format!("{url}: {e}")))?;
        validate_url(&url)?;
        Ok(Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        })
    }

    /// Add or replace a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set the body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// The HTTP method.
    #[must_use]
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The absolute request URL.
    #[must_use]
    pub fn url(&self) -> &Uri {
        &self.url
    }

    /// The request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The request body.
    #[must_use]
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// The `Authorization` header value, once signed.
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
    }

    pub(crate) fn set_authorization(&mut self, value: HeaderValue) {
        self.headers.insert(AUTHORIZATION, value);
    }

    /// Convert into an [`http::Request`] carrying the body bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidPayload`] if the body cannot be serialized.
    pub fn into_http(self) -> Result<http::Request<Vec<u8>>, AuthError> {
        let body = self.body.to_bytes()?.into_owned();
        let mut request = http::Request::new(body);
        *request.method_mut() = self.method.into();
        *request.uri_mut() = self.url;
        *request.headers_mut() = self.headers;
        Ok(request)
    }
}

fn validate_url(url: &Uri) -> Result<(), AuthError> {
    match url.scheme_str() {
        Some("http" | "https") => {}
        Some(other) => {
            return Err(AuthError::InvalidUrl(format!(
                "{url}: unsupported scheme {other}"
            )));
        }
        None => return Err(AuthError::InvalidUrl(format!("{url}: missing scheme"))),
    }
    match url.host() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(AuthError::InvalidUrl(format!("{url}: missing host"))),
    }
}
