//! In-flight request deduplication.
//!
//! Concurrent calls sharing a dedup key collapse into a single network
//! operation; every waiter observes the identical settled outcome. The map
//! entry is removed before the result fans out, so a call issued right after
//! settlement starts a fresh operation instead of rejoining a finished one.

use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::ApiError;

type Outcome = Result<Value, ApiError>;
type PendingMap = HashMap<String, broadcast::Sender<Outcome>>;

/// Map of pending operations keyed by caller-supplied dedup key.
///
/// Exactly one entry exists per key at any instant. The underlying operation
/// runs in its own task: a waiter dropping out cancels only that waiter,
/// never the flight or the other waiters.
#[derive(Default)]
pub struct InFlightQueue {
  pending: Arc<Mutex<PendingMap>>,
}

impl InFlightQueue {
  pub fn new() -> Self {
    Self::default()
  }

  /// Run `producer` under `key`, or join an identical pending call.
  pub async fn run<F>(&self, key: &str, producer: F) -> Outcome
  where
    F: Future<Output = Outcome> + Send + 'static,
  {
    let mut rx = {
      let mut pending = self.pending.lock().expect("in-flight lock poisoned");

      if let Some(tx) = pending.get(key) {
        debug!(key, "joining in-flight request");
        tx.subscribe()
      } else {
        let (tx, rx) = broadcast::channel(1);
        pending.insert(key.to_string(), tx.clone());

        let pending = Arc::clone(&self.pending);
        let key = key.to_string();
        tokio::spawn(async move {
          let outcome = producer.await;
          // Unregister before fan-out: a follow-up call must start fresh.
          pending
            .lock()
            .expect("in-flight lock poisoned")
            .remove(&key);
          let _ = tx.send(outcome);
        });

        rx
      }
    };

    rx.recv().await.unwrap_or(Err(ApiError::Cancelled))
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.pending.lock().expect("in-flight lock poisoned").len()
  }
}
