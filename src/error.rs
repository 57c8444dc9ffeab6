//! Error types for the request pipeline.
//!
//! Every failure that escapes the pipeline is an [`ApiError`], produced by a
//! single classification point in `http::normalize`. Callers never see raw
//! transport errors.

use serde::Deserialize;
use std::time::Duration;

/// Sentinel code used when neither the response body nor the transport
/// supplies one.
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

/// Uniform error payload handed to calling code: `{code, message, details}`.
///
/// Matches the backend failure body; missing fields fall back to defaults so
/// a bare 500 with an empty body still normalizes cleanly.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
  #[serde(default = "unknown_code")]
  pub code: String,
  #[serde(default)]
  pub message: String,
  #[serde(default)]
  pub details: Option<serde_json::Value>,
}

fn unknown_code() -> String {
  UNKNOWN_ERROR.to_string()
}

impl ErrorDetail {
  pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      code: code.into(),
      message: message.into(),
      details: None,
    }
  }

  /// Detail with the unknown-code sentinel.
  pub fn unknown(message: impl Into<String>) -> Self {
    Self::new(UNKNOWN_ERROR, message)
  }
}

/// Classified request failure.
///
/// The variant decides retry eligibility; the embedded [`ErrorDetail`] is the
/// uniform shape surfaced to UI code.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
  /// Connection-level failure, no response received.
  #[error("network error: {0}")]
  Network(String),

  /// The transport gave up waiting for a response.
  #[error("request timed out")]
  Timeout,

  /// HTTP 429. `retry_after` is the server-directed wait, or the 60s default.
  #[error("rate limited: {}", .detail.message)]
  RateLimited {
    retry_after: Duration,
    detail: ErrorDetail,
  },

  /// HTTP 401. Terminal; triggers credential clear and the session guard.
  #[error("unauthorized: {}", .detail.message)]
  Unauthorized { detail: ErrorDetail },

  /// Any other 4xx.
  #[error("request failed ({status}): {}", .detail.message)]
  Client { status: u16, detail: ErrorDetail },

  /// 5xx, or a 2xx whose envelope violates the wire contract.
  #[error("server error ({status}): {}", .detail.message)]
  Server { status: u16, detail: ErrorDetail },

  /// The shared in-flight request this caller was waiting on went away
  /// without settling. Only that caller observes this.
  #[error("request cancelled")]
  Cancelled,
}

impl ApiError {
  /// The uniform `{code, message, details}` shape for this error.
  pub fn detail(&self) -> ErrorDetail {
    match self {
      Self::Network(msg) => ErrorDetail::new("NETWORK_ERROR", msg.clone()),
      Self::Timeout => ErrorDetail::new("TIMEOUT", "request timed out"),
      Self::Cancelled => ErrorDetail::new("CANCELLED", "request cancelled"),
      Self::RateLimited { detail, .. }
      | Self::Unauthorized { detail }
      | Self::Client { detail, .. }
      | Self::Server { detail, .. } => detail.clone(),
    }
  }

  /// HTTP status, when one was received.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::RateLimited { .. } => Some(429),
      Self::Unauthorized { .. } => Some(401),
      Self::Client { status, .. } | Self::Server { status, .. } => Some(*status),
      _ => None,
    }
  }

  /// Failure classes considered likely to succeed on retry.
  pub(crate) fn is_transient(&self) -> bool {
    matches!(
      self,
      Self::Network(_) | Self::Timeout | Self::RateLimited { .. } | Self::Server { .. }
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_detail_defaults_from_empty_body() {
    let detail: ErrorDetail = serde_json::from_str("{}").unwrap();
    assert_eq!(detail.code, UNKNOWN_ERROR);
    assert_eq!(detail.message, "");
    assert!(detail.details.is_none());
  }

  #[test]
  fn test_detail_from_backend_body() {
    let detail: ErrorDetail = serde_json::from_str(
      r#"{"code": "VALIDATION_ERROR", "message": "name is required", "details": {"field": "name"}}"#,
    )
    .unwrap();
    assert_eq!(detail.code, "VALIDATION_ERROR");
    assert_eq!(detail.message, "name is required");
    assert!(detail.details.is_some());
  }

  #[test]
  fn test_transient_classes() {
    assert!(ApiError::Network("connection refused".into()).is_transient());
    assert!(ApiError::Timeout.is_transient());
    assert!(ApiError::Server {
      status: 502,
      detail: ErrorDetail::unknown("bad gateway"),
    }
    .is_transient());
    assert!(!ApiError::Unauthorized {
      detail: ErrorDetail::unknown(""),
    }
    .is_transient());
    assert!(!ApiError::Client {
      status: 404,
      detail: ErrorDetail::new("NOT_FOUND", "no such card"),
    }
    .is_transient());
  }
}
