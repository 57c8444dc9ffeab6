//! Request annotation: identity, auth and content headers.

use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::error::ApiError;

use super::descriptor::RequestDescriptor;
use super::transport::OutboundRequest;

/// Assemble the outbound request for a descriptor.
///
/// Attaches a fresh `X-Request-ID`, the bearer credential when one is
/// present, and a JSON content-type default that caller headers may
/// override. Reads the credential, never writes it.
pub fn annotate(
  base: &Url,
  descriptor: &RequestDescriptor,
  credential: Option<&str>,
) -> Result<OutboundRequest, ApiError> {
  let url = build_url(base, descriptor)?;
  let request_id = Uuid::new_v4().to_string();

  let mut headers: Vec<(String, String)> = vec![
    ("Content-Type".to_string(), "application/json".to_string()),
    ("X-Request-ID".to_string(), request_id.clone()),
  ];

  if let Some(token) = credential {
    let token = token.trim();
    if !token.is_empty() {
      headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
    }
  }

  for (name, value) in &descriptor.headers {
    headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
    headers.push((name.clone(), value.clone()));
  }

  // Method, path and id only. Payloads and tokens stay out of the logs.
  debug!(
    method = descriptor.method.as_str(),
    path = %descriptor.path,
    request_id = %request_id,
    "dispatching request"
  );

  Ok(OutboundRequest {
    method: descriptor.method,
    url,
    headers,
    body: descriptor.body.clone(),
  })
}

fn build_url(base: &Url, descriptor: &RequestDescriptor) -> Result<Url, ApiError> {
  let joined = format!(
    "{}{}",
    base.as_str().trim_end_matches('/'),
    descriptor.path
  );
  let mut url = Url::parse(&joined)
    .map_err(|e| ApiError::Network(format!("invalid request url '{}': {}", joined, e)))?;

  if !descriptor.query.is_empty() {
    let mut pairs = url.query_pairs_mut();
    for (name, value) in &descriptor.query {
      pairs.append_pair(name, value);
    }
  }

  Ok(url)
}
