//! Response normalization and error classification.
//!
//! Unwraps the `{success, data}` transport envelope and maps every failure
//! onto [`ApiError`] in one place. No raw transport error escapes past here.

use serde::Deserialize;
use serde_json::Value;

use crate::credentials::CredentialStore;
use crate::error::{ApiError, ErrorDetail};
use crate::session::SessionGuard;

use super::retry::parse_retry_after;
use super::transport::{RawResponse, TransportError};

/// Success envelope on the wire: `{ "success": true, "data": <T> }`.
#[derive(Debug, Deserialize)]
struct Envelope {
  success: bool,
  #[serde(default)]
  data: Value,
}

/// Classify a transport outcome into the uniform result shape.
///
/// On 401 the credential store is cleared and the session guard notified
/// before the error is returned; everything else is a pure mapping.
pub fn normalize(
  result: Result<RawResponse, TransportError>,
  credentials: &CredentialStore,
  session: &SessionGuard,
) -> Result<Value, ApiError> {
  let response = match result {
    Ok(response) => response,
    Err(TransportError::Timeout) => return Err(ApiError::Timeout),
    Err(TransportError::Network(message)) => return Err(ApiError::Network(message)),
  };

  let status = response.status;

  if (200..300).contains(&status) {
    return unwrap_envelope(status, response.body);
  }

  let detail = failure_detail(status, response.body);

  match status {
    401 => {
      credentials.clear();
      session.notify();
      Err(ApiError::Unauthorized { detail })
    }
    429 => Err(ApiError::RateLimited {
      retry_after: parse_retry_after(response.retry_after),
      detail,
    }),
    400..=499 => Err(ApiError::Client { status, detail }),
    _ => Err(ApiError::Server { status, detail }),
  }
}

/// Terminal rate-limit errors carry a user-facing wait time. Applied once,
/// after the retry loop gives up.
pub fn with_wait_message(error: ApiError) -> ApiError {
  match error {
    ApiError::RateLimited {
      retry_after,
      mut detail,
    } => {
      detail.message = format!(
        "Rate limited by the server. Try again in {} seconds.",
        retry_after.as_secs()
      );
      ApiError::RateLimited {
        retry_after,
        detail,
      }
    }
    other => other,
  }
}

fn unwrap_envelope(status: u16, body: Option<Value>) -> Result<Value, ApiError> {
  let body = match body {
    // Empty success body (e.g. a 204 delete) carries no data
    None => return Ok(Value::Null),
    Some(body) => body,
  };

  match serde_json::from_value::<Envelope>(body.clone()) {
    Ok(envelope) if envelope.success => Ok(envelope.data),
    Ok(_) => Err(ApiError::Server {
      status,
      detail: failure_detail(status, Some(body)),
    }),
    Err(_) => Err(ApiError::Server {
      status,
      detail: ErrorDetail::unknown("malformed response envelope"),
    }),
  }
}

/// Error detail from a failure body: code from the response if present, else
/// the unknown sentinel.
fn failure_detail(status: u16, body: Option<Value>) -> ErrorDetail {
  body
    .and_then(|b| serde_json::from_value::<ErrorDetail>(b).ok())
    .unwrap_or_else(|| ErrorDetail::unknown(format!("request failed with status {}", status)))
}
