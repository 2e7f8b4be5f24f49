//! Hawk request signing and webhook signature verification for the BVNK API.
//!
//! This crate covers both directions of message authentication between a
//! client and the BVNK payments API:
//!
//! - Outbound: every API request is signed with the Hawk header scheme, an
//!   HMAC-SHA256 over a newline-delimited normalized string carrying a fresh
//!   timestamp and nonce.
//! - Inbound: every webhook is authenticated by recomputing a hex
//!   HMAC-SHA256 over `path + content_type + raw_body` and comparing it in
//!   constant time with the delivered signature.
//!
//! # Usage
//!
//! ```rust
//! use bvnk_auth::webhook::{VerificationOutcome, WebhookEvent, verify};
//! use bvnk_auth::{Credential, HawkSigner, HttpMethod, OutboundRequest};
//!
//! let credential = Credential::new("key-id", "s3cr3t").with_webhook_secret("whsec");
//!
//! // Sign an outbound request.
//! let request = OutboundRequest::new(HttpMethod::Get, "https://api.bvnk.com/api/wallet").unwrap();
//! let signed = HawkSigner::default().sign(&credential, request).unwrap();
//! assert!(signed.authorization().unwrap().starts_with("Hawk id=\"key-id\""));
//!
//! // Verify an inbound webhook.
//! let event = WebhookEvent::new(
//!     "/bvnk/webhook",
//!     "application/json",
//!     br#"{"source":"payment","event":"statusChanged"}"#.to_vec(),
//!     Some("d719d2ada1c87a83b62e896aa3cce30693fdab055c70c6d87f4ea4fcc481ead3".to_owned()),
//! );
//! assert!(matches!(verify(&credential, event).unwrap(), VerificationOutcome::Accepted(_)));
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Normalized string and webhook string construction
//! - [`clock`] - Injectable time source
//! - [`credentials`] - Credential model and provider trait
//! - [`error`] - Error types
//! - [`hawk`] - Hawk header signing, parsing and verification
//! - [`mac`] - HMAC-SHA256 and SHA-256 primitives
//! - [`nonce`] - Injectable nonce source
//! - [`request`] - Outbound request model
//! - [`webhook`] - Inbound webhook verification

pub mod canonical;
pub mod clock;
pub mod credentials;
pub mod error;
pub mod hawk;
pub mod mac;
pub mod nonce;
pub mod request;
pub mod webhook;

pub use canonical::HawkArtifacts;
pub use clock::{Clock, FixedClock, SystemClock};
pub use credentials::{Credential, CredentialProvider, SecretKey, StaticCredentialProvider};
pub use error::AuthError;
pub use hawk::{HawkHeader, HawkSigner, parse_authorization_header, verify_authorization};
pub use nonce::{FixedNonce, NonceSource, RandomNonce};
pub use request::{HttpMethod, OutboundRequest, RequestBody};
pub use webhook::{RejectionReason, VerificationOutcome, WebhookEvent};
