//! bvnk-hawk - sign BVNK API requests and verify BVNK webhooks.
//!
//! # Usage
//!
//! ```text
//! BVNK_HAWK_ID=... BVNK_HAWK_SECRET=... bvnk-hawk sign --url https://api.bvnk.com/api/wallet
//! BVNK_WEBHOOK_SECRET=... bvnk-hawk verify-webhook --body-file body.json --signature <hex>
//! bvnk-hawk request custom --method POST --path /api/v1/pay/summary --body '{"amount":10}'
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BVNK_HAWK_ID` | *(empty)* | Hawk key id |
//! | `BVNK_HAWK_SECRET` | *(empty)* | Hawk signing secret |
//! | `BVNK_ENABLE_PAYLOAD_HASHING` | `false` | Include a payload hash in signatures |
//! | `BVNK_WEBHOOK_SECRET` | *(empty)* | Webhook signing secret |
//! | `BVNK_BASE_URL` | `https://api.bvnk.com` | API base URL |
//! | `BVNK_WEBHOOK_PATH` | `/bvnk/webhook` | Path covered by webhook signatures |
//! | `BVNK_SIGNATURE_HEADER` | `x-signature` | Header carrying the webhook signature |
//! | `BVNK_NONCE_BYTES` | `12` | Random bytes per nonce |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use bvnk_auth::webhook::{self, VerificationOutcome, WebhookEvent};
use bvnk_auth::{Credential, HttpMethod, OutboundRequest, RequestBody};
use bvnk_core::{ApiClient, BvnkConfig, Operation};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "bvnk-hawk")]
#[command(about = "Sign BVNK API requests and verify BVNK webhooks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the Hawk Authorization header for a request
    Sign {
        /// HTTP method
        #[arg(long, short, default_value = "GET")]
        method: HttpMethod,

        /// Absolute request URL
        #[arg(long, short)]
        url: String,

        /// Request body
        #[arg(long, conflicts_with = "body_file")]
        body: Option<String>,

        /// Read the request body from a file
        #[arg(long)]
        body_file: Option<PathBuf>,
    },

    /// Verify a webhook signature; exits non-zero when rejected
    VerifyWebhook {
        /// File holding the raw webhook body
        #[arg(long)]
        body_file: PathBuf,

        /// Delivered hex signature
        #[arg(long, short)]
        signature: String,

        /// Delivered content type
        #[arg(long, default_value = webhook::DEFAULT_CONTENT_TYPE)]
        content_type: String,

        /// Signed path (defaults to BVNK_WEBHOOK_PATH)
        #[arg(long)]
        path: Option<String>,
    },

    /// Build and print a signed API request
    Request {
        #[command(subcommand)]
        operation: RequestOperation,
    },
}

#[derive(Debug, Subcommand)]
enum RequestOperation {
    /// GET /api/wallet
    ListWallets,

    /// Any endpoint
    Custom {
        /// HTTP method
        #[arg(long, short, default_value = "GET")]
        method: HttpMethod,

        /// Path starting with '/', optionally with a query
        #[arg(long, short)]
        path: String,

        /// JSON request body
        #[arg(long)]
        body: Option<String>,
    },
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = BvnkConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config.log_level)?;

    match cli.command {
        Commands::Sign {
            method,
            url,
            body,
            body_file,
        } => sign(&config, method, &url, body, body_file.as_deref()),
        Commands::VerifyWebhook {
            body_file,
            signature,
            content_type,
            path,
        } => verify_webhook(&config, &body_file, signature, content_type, path),
        Commands::Request { operation } => build_request(&config, &operation.into()),
    }
}

impl From<RequestOperation> for Operation {
    fn from(operation: RequestOperation) -> Self {
        match operation {
            RequestOperation::ListWallets => Self::ListWallets,
            RequestOperation::Custom { method, path, body } => {
                Self::CustomApiCall { method, path, body }
            }
        }
    }
}

fn sign(
    config: &BvnkConfig,
    method: HttpMethod,
    url: &str,
    body: Option<String>,
    body_file: Option<&Path>,
) -> Result<ExitCode> {
    let credential = config.credential().context("invalid Hawk credentials")?;

    let body = match (body, body_file) {
        (_, Some(file)) => RequestBody::Bytes(
            std::fs::read(file)
                .with_context(|| format!("failed to read body file {}", file.display()))?,
        ),
        (Some(text), None) => RequestBody::Text(text),
        (None, None) => RequestBody::Empty,
    };
    let request = OutboundRequest::new(method, url)?.with_body(body);

    let header = config.signer().authorization(&credential, &request)?;
    info!(id = %header.id, ts = header.ts, "signed request");
    println!("{header}");
    Ok(ExitCode::SUCCESS)
}

fn verify_webhook(
    config: &BvnkConfig,
    body_file: &Path,
    signature: String,
    content_type: String,
    path: Option<String>,
) -> Result<ExitCode> {
    config.validate().context("invalid configuration")?;
    let raw_body = std::fs::read(body_file)
        .with_context(|| format!("failed to read body file {}", body_file.display()))?;
    let credential = Credential::new(config.hawk_id.clone(), config.hawk_secret.clone())
        .with_webhook_secret(config.webhook_secret.clone());

    let event = WebhookEvent::new(
        path.unwrap_or_else(|| config.webhook_path.clone()),
        content_type,
        raw_body,
        Some(signature),
    );

    match webhook::verify(&credential, event).context("cannot verify webhook")? {
        VerificationOutcome::Accepted(_) => {
            println!("accepted");
            Ok(ExitCode::SUCCESS)
        }
        VerificationOutcome::Rejected(reason) => {
            println!("rejected: {reason}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn build_request(config: &BvnkConfig, operation: &Operation) -> Result<ExitCode> {
    let client = ApiClient::from_config(config).context("invalid configuration")?;
    let request = client.build(operation)?;

    println!("{} {}", request.method(), request.uri());
    for (name, value) in request.headers() {
        println!("{name}: {}", value.to_str().unwrap_or("<binary>"));
    }
    if !request.body().is_empty() {
        println!();
        println!("{}", String::from_utf8_lossy(request.body()));
    }
    Ok(ExitCode::SUCCESS)
}
