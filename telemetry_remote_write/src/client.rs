//! # Write Client
//!
//! Sends one encoded `WriteRequest` per call and classifies the response.
//! Retrying is left to the caller; see `WriteError::is_retryable`.
//!
//! Responses are parsed by surf into an `http_types::StatusCode`, which has no variant for
//! unregistered codes such as 520-599. Those responses fail inside the transport and surface
//! as `TransportError::Failed`, which is retryable like a 5xx but carries no status.

use async_std::io::prelude::*;
use async_std::io::{self, BufReader};
use surf::http::auth::BasicAuth;
use surf::http::headers::{CONTENT_ENCODING, CONTENT_TYPE, USER_AGENT};
use surf::http::Method;
use surf::{Body, RequestBuilder, StatusCode};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{TransportError, WriteError};

pub const REMOTE_WRITE_VERSION_HEADER: &str = "X-Prometheus-Remote-Write-Version";
pub const REMOTE_WRITE_VERSION: &str = "0.1.0";
pub const SNAPPY_ENCODING: &str = "snappy";
pub const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";

/// How much of an error response is kept as the diagnostic message.
pub const MAX_ERR_MSG_LEN: u64 = 256;

/// How much of a response body is read (and discarded) before the connection is released.
const MAX_DRAIN_LEN: u64 = 64 * 1024;

pub struct WriteClient {
    http: surf::Client,
    config: ClientConfig,
}

impl WriteClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(surf::Client::new(), config)
    }

    /// Use an existing surf client, e.g. one shared with other requests
    pub fn with_client(http: surf::Client, config: ClientConfig) -> Self {
        WriteClient { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send an encoded write request to the remote write endpoint
    pub async fn send(&self, payload: impl Into<Vec<u8>>) -> Result<(), WriteError> {
        let payload = payload.into();
        debug!(url = %self.config.url(), bytes = payload.len(), "sending remote write request");

        let request = self.build_request(payload);
        let timeout = self.config.timeout();
        match async_std::future::timeout(timeout, self.round_trip(request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(timeout).into()),
        }
    }

    fn build_request(&self, payload: Vec<u8>) -> surf::Request {
        let auth = BasicAuth::new(self.config.instance_id(), self.config.api_key());
        RequestBuilder::new(Method::Post, self.config.url().clone())
            .body(Body::from_bytes(payload))
            .header(CONTENT_ENCODING, SNAPPY_ENCODING)
            .header(CONTENT_TYPE, PROTOBUF_CONTENT_TYPE)
            .header(USER_AGENT, self.config.user_agent())
            .header(REMOTE_WRITE_VERSION_HEADER, REMOTE_WRITE_VERSION)
            .header(auth.name(), auth.value())
            .build()
    }

    async fn round_trip(&self, request: surf::Request) -> Result<(), WriteError> {
        let mut response = self
            .http
            .send(request)
            .await
            .map_err(TransportError::Failed)?;
        let status = response.status();
        debug!(status = u16::from(status), "received remote write response");

        // The body is released exactly once, whatever the classification
        let mut body = response.take_body();
        let outcome = classify(status, &mut body).await;
        release(body).await;
        outcome
    }
}

async fn classify(status: StatusCode, body: &mut Body) -> Result<(), WriteError> {
    if status.is_success() {
        return Ok(());
    }

    let line = read_error_line(body).await;
    warn!(status = u16::from(status), message = %line, "remote write rejected");
    if status.is_server_error() {
        Err(WriteError::Server { status, line })
    } else {
        Err(WriteError::Response { status, line })
    }
}

/// Reads the first line within the first `MAX_ERR_MSG_LEN` bytes of the body
async fn read_error_line(body: &mut Body) -> String {
    let mut reader = BufReader::new((&mut *body).take(MAX_ERR_MSG_LEN));
    let mut line = Vec::new();
    if reader.read_until(b'\n', &mut line).await.is_err() {
        return String::new();
    }
    while let Some(b'\n') | Some(b'\r') = line.last() {
        line.pop();
    }
    String::from_utf8_lossy(&line).into_owned()
}

/// Discard what's left of the body so the connection can be reused
async fn release(body: Body) {
    let mut rest = body.take(MAX_DRAIN_LEN);
    if let Err(err) = io::copy(&mut rest, &mut io::sink()).await {
        debug!(error = %err, "failed to drain remote write response");
    }
}
