//! End-to-end tests for BVNK request signing and webhook verification.
//!
//! Each test starts an in-process mock of the BVNK API on a random local
//! port. The mock verifies the Hawk `Authorization` header of API calls and
//! runs webhook deliveries through a [`PaymentStatusTrigger`]. Requests are
//! sent over real HTTP with `reqwest`.
//!
//! Run them with:
//! ```text
//! cargo test -p bvnk-integration
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Once};

use anyhow::{Context, Result};
use bvnk_auth::hawk::DEFAULT_TIMESTAMP_SKEW_SECS;
use bvnk_auth::{
    AuthError, Credential, HttpMethod, OutboundRequest, RequestBody, StaticCredentialProvider,
    SystemClock, verify_authorization,
};
use bvnk_core::{PaymentStatusTrigger, TriggerOutcome};
use bytes::Bytes;
use http::header::{AUTHORIZATION, HOST};
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

static INIT: Once = Once::new();

/// Hawk key id accepted by the mock.
pub const KEY_ID: &str = "integration-key";
/// Hawk secret accepted by the mock.
pub const HAWK_SECRET: &str = "integration-secret";
/// Webhook secret used by the mock's trigger.
pub const WEBHOOK_SECRET: &str = "whsec";
/// Path the mock receives webhooks on.
pub const WEBHOOK_PATH: &str = "/bvnk/webhook";

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// The credential shared by the tests and the mock.
#[must_use]
pub fn credential(payload_hashing: bool) -> Credential {
    Credential::new(KEY_ID, HAWK_SECRET)
        .with_payload_hashing(payload_hashing)
        .with_webhook_secret(WEBHOOK_SECRET)
}

struct MockState {
    provider: StaticCredentialProvider,
    trigger: PaymentStatusTrigger,
}

/// A running mock BVNK API. The server stops when this is dropped.
#[derive(Debug)]
pub struct MockBvnk {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl MockBvnk {
    /// Start a mock that requires payload hashes when `payload_hashing` is set.
    pub async fn start(payload_hashing: bool) -> Result<Self> {
        init_tracing();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind mock server")?;
        let addr = listener.local_addr()?;

        let state = Arc::new(MockState {
            provider: StaticCredentialProvider::new([credential(payload_hashing)]),
            trigger: PaymentStatusTrigger::new(
                credential(payload_hashing),
                WEBHOOK_PATH,
                http::header::HeaderName::from_static("x-signature"),
            ),
        });

        let task = tokio::spawn(async move {
            let http = HttpConnBuilder::new(TokioExecutor::new());
            loop {
                let (stream, peer_addr) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };
                let state = Arc::clone(&state);
                let svc = service_fn(move |req| handle(Arc::clone(&state), req));
                let conn = http.serve_connection(TokioIo::new(stream), svc).into_owned();
                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        debug!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }
        });

        Ok(Self { addr, task })
    }

    /// Base URL of the mock, suitable as the API base URL.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for MockBvnk {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Send a built request and return the status and response body.
pub async fn send(request: http::Request<Vec<u8>>) -> Result<(StatusCode, String)> {
    let request = reqwest::Request::try_from(request).context("failed to convert request")?;
    let response = reqwest::Client::new()
        .execute(request)
        .await
        .context("request failed")?;
    let status = response.status();
    let body = response.text().await.context("failed to read response")?;
    Ok((status, body))
}

async fn handle(
    state: Arc<MockState>,
    req: http::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes().to_vec(),
        Err(e) => return Ok(respond(StatusCode::BAD_REQUEST, e.to_string())),
    };

    if parts.method == Method::POST && parts.uri.path() == state.trigger.webhook_path() {
        let response = match state.trigger.handle(&parts, body) {
            Ok(TriggerOutcome::Dispatched(fields)) => {
                respond(StatusCode::OK, serde_json::Value::Object(fields).to_string())
            }
            Ok(TriggerOutcome::Ignored { .. }) => respond(StatusCode::ACCEPTED, "ignored"),
            Ok(TriggerOutcome::Dropped(reason)) => {
                respond(StatusCode::UNAUTHORIZED, reason.to_string())
            }
            Err(e) => respond(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };
        return Ok(response);
    }

    let response = match verify_api_request(&state, &parts, body) {
        Ok(id) => respond(
            StatusCode::OK,
            serde_json::json!({ "keyId": id, "path": parts.uri.path() }).to_string(),
        ),
        Err(e) => respond(StatusCode::UNAUTHORIZED, e.to_string()),
    };
    Ok(response)
}

/// Rebuild the request as the client saw it and check its Hawk header.
fn verify_api_request(
    state: &MockState,
    parts: &http::request::Parts,
    body: Vec<u8>,
) -> Result<String, AuthError> {
    let host = parts
        .headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AuthError::InvalidUrl("missing Host header".to_owned()))?;
    let path = parts
        .uri
        .path_and_query()
        .map_or("/", http::uri::PathAndQuery::as_str);
    let method = HttpMethod::try_from(&parts.method)?;

    let mut request = OutboundRequest::new(method, &format!("http://{host}{path}"))?
        .with_body(RequestBody::Bytes(body));
    if let Some(value) = parts.headers.get(AUTHORIZATION) {
        request = request.with_header(AUTHORIZATION, value.clone());
    }

    let header = verify_authorization(
        &request,
        &state.provider,
        &SystemClock,
        DEFAULT_TIMESTAMP_SKEW_SECS,
    )?;
    Ok(header.id)
}

fn respond(status: StatusCode, body: impl Into<Bytes>) -> http::Response<Full<Bytes>> {
    let mut response = http::Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
}

mod test_hawk;
mod test_webhook;
