//! Payment status webhook trigger.
//!
//! Authenticates inbound webhooks and forwards only payment status changes.
//! The signature is checked against the configured webhook path rather than
//! the path the request arrived on, since proxies may rewrite the latter.

use bvnk_auth::webhook::{self, RejectionReason, VerificationOutcome, WebhookEvent};
use bvnk_auth::Credential;
use http::header::HeaderName;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::BvnkConfig;
use crate::error::{BvnkError, BvnkResult};

/// `source` value of payment events.
pub const PAYMENT_SOURCE: &str = "payment";

/// `event` value of status change events.
pub const STATUS_CHANGED_EVENT: &str = "statusChanged";

/// What the trigger did with one webhook.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerOutcome {
    /// Authentic payment status change; carries the webhook fields.
    Dispatched(Map<String, Value>),
    /// Authentic, but not a payment status change.
    Ignored {
        /// Received `source`, if any.
        source: Option<String>,
        /// Received `event`, if any.
        event: Option<String>,
    },
    /// Failed authentication.
    Dropped(RejectionReason),
}

/// Webhook handler that dispatches payment status changes.
#[derive(Debug, Clone)]
pub struct PaymentStatusTrigger {
    credential: Credential,
    webhook_path: String,
    signature_header: HeaderName,
}

impl PaymentStatusTrigger {
    /// Create a trigger.
    pub fn new(
        credential: Credential,
        webhook_path: impl Into<String>,
        signature_header: HeaderName,
    ) -> Self {
        Self {
            credential,
            webhook_path: webhook_path.into(),
            signature_header,
        }
    }

    /// Create a trigger from configuration. Only the webhook secret is required.
    ///
    /// # Errors
    ///
    /// Returns [`BvnkError::Config`] if the configuration is invalid or no
    /// webhook secret is set.
    pub fn from_config(config: &BvnkConfig) -> BvnkResult<Self> {
        config.validate()?;
        if config.webhook_secret.is_empty() {
            return Err(BvnkError::Config("BVNK_WEBHOOK_SECRET is not set".to_owned()));
        }
        let credential = Credential::new(config.hawk_id.clone(), config.hawk_secret.clone())
            .with_webhook_secret(config.webhook_secret.clone());
        Ok(Self::new(
            credential,
            config.webhook_path.clone(),
            config.signature_header_name()?,
        ))
    }

    /// The path covered by webhook signatures.
    #[must_use]
    pub fn webhook_path(&self) -> &str {
        &self.webhook_path
    }

    /// Authenticate and filter one received webhook.
    ///
    /// # Errors
    ///
    /// Returns [`BvnkError::Auth`] only when the webhook secret is missing.
    /// Rejected webhooks are reported as [`TriggerOutcome::Dropped`].
    pub fn handle(
        &self,
        parts: &http::request::Parts,
        raw_body: impl Into<Vec<u8>>,
    ) -> BvnkResult<TriggerOutcome> {
        let event =
            WebhookEvent::from_parts(parts, raw_body, &self.webhook_path, &self.signature_header);
        self.dispatch(event)
    }

    /// Authenticate and filter an already extracted webhook.
    ///
    /// # Errors
    ///
    /// See [`PaymentStatusTrigger::handle`].
    pub fn dispatch(&self, event: WebhookEvent) -> BvnkResult<TriggerOutcome> {
        let path = event.path().to_owned();
        let content_type = event.content_type().to_owned();

        let fields = match webhook::verify(&self.credential, event)? {
            VerificationOutcome::Accepted(fields) => fields,
            VerificationOutcome::Rejected(reason) => {
                warn!(
                    %reason,
                    path = %path,
                    content_type = %content_type,
                    header = %self.signature_header,
                    "Dropping BVNK webhook"
                );
                return Ok(TriggerOutcome::Dropped(reason));
            }
        };

        let source = field_text(&fields, "source");
        let event = field_text(&fields, "event");
        if source.as_deref() == Some(PAYMENT_SOURCE) && event.as_deref() == Some(STATUS_CHANGED_EVENT)
        {
            debug!("Dispatching BVNK payment status change");
            Ok(TriggerOutcome::Dispatched(fields))
        } else {
            info!(
                source = source.as_deref().unwrap_or("<none>"),
                event = event.as_deref().unwrap_or("<none>"),
                "Ignoring BVNK webhook that is not a payment status change"
            );
            Ok(TriggerOutcome::Ignored { source, event })
        }
    }
}

fn field_text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
