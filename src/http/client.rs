//! Pipeline orchestrator.
//!
//! Every UI action funnels through [`HttpClient::request`]: dedup lookup,
//! cache lookup, annotation, transport, bounded retry, normalization, cache
//! admission, fan-out. The typed verb helpers only shape arguments.

use serde_json::Value;
use std::sync::Arc;
use tracing::warn;
use url::Url;

use crate::cache::ResponseCache;
use crate::config::{ClientConfig, ConfigError};
use crate::credentials::CredentialStore;
use crate::error::ApiError;
use crate::session::{SessionGuard, SessionSink};

use super::annotate::annotate;
use super::dedup::InFlightQueue;
use super::descriptor::RequestDescriptor;
use super::normalize::{normalize, with_wait_message};
use super::retry::{RetryPolicy, RetryState};
use super::transport::{ReqwestTransport, Transport};

struct Inner {
  base_url: Url,
  transport: Box<dyn Transport>,
  credentials: Arc<CredentialStore>,
  session: SessionGuard,
  cache: ResponseCache,
  policy: RetryPolicy,
}

/// The outbound request pipeline. Cheap to clone; all state is shared.
#[derive(Clone)]
pub struct HttpClient {
  inner: Arc<Inner>,
  dedup: Arc<InFlightQueue>,
}

impl HttpClient {
  /// Pipeline over the real HTTP stack.
  pub fn new(
    config: &ClientConfig,
    credentials: Arc<CredentialStore>,
    sink: Arc<dyn SessionSink>,
  ) -> Result<Self, ConfigError> {
    let transport = ReqwestTransport::new(config.timeout())
      .map_err(|e| ConfigError::Invalid(e.to_string()))?;
    Self::with_transport(config, credentials, sink, Box::new(transport))
  }

  /// Pipeline over an explicit transport.
  pub fn with_transport(
    config: &ClientConfig,
    credentials: Arc<CredentialStore>,
    sink: Arc<dyn SessionSink>,
    transport: Box<dyn Transport>,
  ) -> Result<Self, ConfigError> {
    let base_url = config.validate()?;

    Ok(Self {
      inner: Arc::new(Inner {
        base_url,
        transport,
        credentials,
        session: SessionGuard::new(sink),
        cache: ResponseCache::new(config.cache_ttl(), config.volatile_paths.clone()),
        policy: RetryPolicy::new(config.max_attempts, config.retry_base_delay()),
      }),
      dedup: Arc::new(InFlightQueue::new()),
    })
  }

  /// The credential store this pipeline reads from.
  pub fn credentials(&self) -> &CredentialStore {
    &self.inner.credentials
  }

  /// Issue a request through the full pipeline.
  pub async fn request(&self, descriptor: RequestDescriptor) -> Result<Value, ApiError> {
    match descriptor.dedup_key.clone() {
      Some(key) => {
        let inner = Arc::clone(&self.inner);
        self.dedup.run(&key, execute(inner, descriptor)).await
      }
      None => execute(Arc::clone(&self.inner), descriptor).await,
    }
  }

  pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
    self.request(RequestDescriptor::get(path)).await
  }

  pub async fn post(&self, path: &str, body: Value) -> Result<Value, ApiError> {
    self.request(RequestDescriptor::post(path).body(body)).await
  }

  pub async fn put(&self, path: &str, body: Value) -> Result<Value, ApiError> {
    self.request(RequestDescriptor::put(path).body(body)).await
  }

  pub async fn patch(&self, path: &str, body: Value) -> Result<Value, ApiError> {
    self.request(RequestDescriptor::patch(path).body(body)).await
  }

  pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
    self.request(RequestDescriptor::delete(path)).await
  }

  #[cfg(test)]
  fn cache_len(&self) -> usize {
    self.inner.cache.len()
  }
}

/// One pass through cache, annotation, transport, retry and normalization.
async fn execute(inner: Arc<Inner>, descriptor: RequestDescriptor) -> Result<Value, ApiError> {
  let method = descriptor.method.as_str();
  let cacheable = inner
    .cache
    .admissible(method, &descriptor.path, descriptor.cacheable);
  let cache_key = descriptor.cache_key();

  if cacheable {
    if let Some(hit) = inner.cache.lookup(&cache_key) {
      return Ok(hit);
    }
  }

  // Annotated once: retried attempts reuse the identical outbound request.
  let credential = inner.credentials.get();
  let outbound = annotate(&inner.base_url, &descriptor, credential.as_deref())?;

  let idempotent = descriptor.idempotent();
  let mut state = RetryState::new();

  let data = loop {
    let result = inner.transport.send(outbound.clone()).await;

    match normalize(result, &inner.credentials, &inner.session) {
      Ok(data) => break data,
      Err(error) => {
        if !inner.policy.should_retry(&error, &state, idempotent) {
          return Err(with_wait_message(error));
        }

        let delay = inner.policy.delay_for(&error, &state);
        warn!(
          method,
          path = %descriptor.path,
          attempt = state.attempt() + 1,
          delay_ms = delay.as_millis() as u64,
          error = %error,
          "transient failure, retrying"
        );
        tokio::time::sleep(delay).await;
        state.advance();
      }
    }
  };

  if cacheable {
    inner.cache.admit(cache_key, &data);
  }

  Ok(data)
}
