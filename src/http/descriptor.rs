//! Outbound request description.

use serde_json::Value;

use crate::cache::request_key;

/// HTTP methods used by the dashboard API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
  Get,
  Post,
  Put,
  Patch,
  Delete,
}

impl Method {
  pub fn as_str(&self) -> &'static str {
    match self {
      Method::Get => "GET",
      Method::Post => "POST",
      Method::Put => "PUT",
      Method::Patch => "PATCH",
      Method::Delete => "DELETE",
    }
  }

  /// Methods safe to repeat without an explicit marking.
  pub fn is_idempotent(&self) -> bool {
    matches!(self, Method::Get | Method::Put | Method::Delete)
  }
}

/// Description of one outbound call. Immutable once handed to the pipeline;
/// a retried attempt reuses it unmodified.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
  pub method: Method,
  pub path: String,
  pub query: Vec<(String, String)>,
  pub body: Option<Value>,
  pub headers: Vec<(String, String)>,
  /// Caller-supplied key for collapsing concurrent identical calls.
  /// Without one, no deduplication occurs for this call.
  pub dedup_key: Option<String>,
  /// Caller override of the cache admission predicate. `Some(false)` opts a
  /// read out; volatile paths stay excluded either way.
  pub cacheable: Option<bool>,
  /// Marks a non-idempotent request as safe to re-issue.
  pub retry_safe: bool,
}

impl RequestDescriptor {
  pub fn new(method: Method, path: impl Into<String>) -> Self {
    Self {
      method,
      path: path.into(),
      query: Vec::new(),
      body: None,
      headers: Vec::new(),
      dedup_key: None,
      cacheable: None,
      retry_safe: false,
    }
  }

  pub fn get(path: impl Into<String>) -> Self {
    Self::new(Method::Get, path)
  }

  pub fn post(path: impl Into<String>) -> Self {
    Self::new(Method::Post, path)
  }

  pub fn put(path: impl Into<String>) -> Self {
    Self::new(Method::Put, path)
  }

  pub fn patch(path: impl Into<String>) -> Self {
    Self::new(Method::Patch, path)
  }

  pub fn delete(path: impl Into<String>) -> Self {
    Self::new(Method::Delete, path)
  }

  pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.query.push((name.into(), value.into()));
    self
  }

  pub fn body(mut self, body: Value) -> Self {
    self.body = Some(body);
    self
  }

  pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.headers.push((name.into(), value.into()));
    self
  }

  pub fn dedup_key(mut self, key: impl Into<String>) -> Self {
    self.dedup_key = Some(key.into());
    self
  }

  /// Opt this read out of the response cache.
  pub fn no_cache(mut self) -> Self {
    self.cacheable = Some(false);
    self
  }

  /// Mark a POST as idempotent so transient failures may be retried.
  pub fn retry_safe(mut self) -> Self {
    self.retry_safe = true;
    self
  }

  /// Cache identity: method + path + canonicalized query.
  pub(crate) fn cache_key(&self) -> String {
    request_key(self.method.as_str(), &self.path, &self.query)
  }

  pub(crate) fn idempotent(&self) -> bool {
    self.retry_safe || self.method.is_idempotent()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_idempotency_defaults() {
    assert!(RequestDescriptor::get("/agents").idempotent());
    assert!(RequestDescriptor::put("/agents/1").idempotent());
    assert!(RequestDescriptor::delete("/agents/1").idempotent());
    assert!(!RequestDescriptor::post("/agents").idempotent());
    assert!(!RequestDescriptor::patch("/agents/1").idempotent());
    assert!(RequestDescriptor::post("/agents").retry_safe().idempotent());
  }

  #[test]
  fn test_cache_key_covers_query() {
    let plain = RequestDescriptor::get("/agents");
    let paged = RequestDescriptor::get("/agents").query("page", "2");
    assert_ne!(plain.cache_key(), paged.cache_key());

    let body = RequestDescriptor::get("/agents").body(json!({"x": 1}));
    assert_eq!(plain.cache_key(), body.cache_key());
  }
}
