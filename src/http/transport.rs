//! Transport seam over the HTTP stack.
//!
//! The pipeline talks to the network through the [`Transport`] trait so the
//! orchestrator can be exercised against a scripted transport in tests.
//! [`ReqwestTransport`] is the production implementation.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::descriptor::Method;

/// Fully annotated request, ready for the wire.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
  pub method: Method,
  pub url: Url,
  pub headers: Vec<(String, String)>,
  pub body: Option<Value>,
}

/// Raw response before normalization.
#[derive(Debug, Clone)]
pub struct RawResponse {
  pub status: u16,
  /// Server-directed wait from a `Retry-After` header, in seconds.
  pub retry_after: Option<u64>,
  /// Parsed JSON body; `None` for an empty or non-JSON body.
  pub body: Option<Value>,
}

/// Connection-level failure: no response was received.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
  #[error("request timed out")]
  Timeout,

  #[error("{0}")]
  Network(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
  async fn send(&self, request: OutboundRequest) -> Result<RawResponse, TransportError>;
}

/// reqwest-backed transport with a fixed per-request timeout.
pub struct ReqwestTransport {
  client: reqwest::Client,
}

impl ReqwestTransport {
  pub fn new(timeout: Duration) -> Result<Self, TransportError> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| TransportError::Network(format!("failed to build http client: {}", e)))?;

    Ok(Self { client })
  }
}

#[async_trait]
impl Transport for ReqwestTransport {
  async fn send(&self, request: OutboundRequest) -> Result<RawResponse, TransportError> {
    let method = match request.method {
      Method::Get => reqwest::Method::GET,
      Method::Post => reqwest::Method::POST,
      Method::Put => reqwest::Method::PUT,
      Method::Patch => reqwest::Method::PATCH,
      Method::Delete => reqwest::Method::DELETE,
    };

    let mut builder = self.client.request(method, request.url);
    for (name, value) in &request.headers {
      builder = builder.header(name, value);
    }
    if let Some(body) = &request.body {
      builder = builder.json(body);
    }

    let response = builder.send().await.map_err(classify_send_error)?;

    let status = response.status().as_u16();
    let retry_after = response
      .headers()
      .get(reqwest::header::RETRY_AFTER)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.trim().parse().ok());

    let bytes = response.bytes().await.map_err(classify_send_error)?;
    let body = if bytes.is_empty() {
      None
    } else {
      serde_json::from_slice(&bytes).ok()
    };

    Ok(RawResponse {
      status,
      retry_after,
      body,
    })
  }
}

fn classify_send_error(error: reqwest::Error) -> TransportError {
  if error.is_timeout() {
    TransportError::Timeout
  } else {
    TransportError::Network(error.to_string())
  }
}
