//! Configuration, API operations and webhook handling for the BVNK integration.
//!
//! This crate wires the `bvnk-auth` engine to its surroundings: it loads the
//! environment-driven configuration, turns API operations into signed
//! requests, and filters authenticated webhooks down to payment status
//! changes.

mod config;
mod error;
mod operations;
mod trigger;

pub use config::{BvnkConfig, DEFAULT_BASE_URL, DEFAULT_WEBHOOK_PATH};
pub use error::{BvnkError, BvnkResult};
pub use operations::{ApiClient, Operation, WALLETS_PATH};
pub use trigger::{PAYMENT_SOURCE, PaymentStatusTrigger, STATUS_CHANGED_EVENT, TriggerOutcome};
