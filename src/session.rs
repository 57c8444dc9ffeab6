//! Session-termination side effect.
//!
//! When the backend answers 401 the pipeline clears the credential store and
//! asks the host application to navigate to its login entry point. Several
//! in-flight requests can fail with 401 in the same instant after a token
//! expires; the guard latches so only the first one navigates.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Seam for the host application's "go to login" navigation.
pub trait SessionSink: Send + Sync {
  fn session_expired(&self);
}

impl<F: Fn() + Send + Sync> SessionSink for F {
  fn session_expired(&self) {
    self()
  }
}

/// Fires the sink at most once per cool-down window.
///
/// The latch resets after the cool-down (1s by default) so a later, genuine
/// re-expiry can navigate again.
pub struct SessionGuard {
  sink: Arc<dyn SessionSink>,
  redirecting: Arc<AtomicBool>,
  cooldown: Duration,
}

impl SessionGuard {
  pub fn new(sink: Arc<dyn SessionSink>) -> Self {
    Self {
      sink,
      redirecting: Arc::new(AtomicBool::new(false)),
      cooldown: Duration::from_secs(1),
    }
  }

  #[cfg(test)]
  pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
    self.cooldown = cooldown;
    self
  }

  /// Report an expired session. Callers may invoke this concurrently; the
  /// sink fires once per window.
  pub fn notify(&self) {
    if self.redirecting.swap(true, Ordering::SeqCst) {
      return;
    }

    warn!("session expired, navigating to login");
    self.sink.session_expired();

    let flag = Arc::clone(&self.redirecting);
    let cooldown = self.cooldown;
    tokio::spawn(async move {
      tokio::time::sleep(cooldown).await;
      flag.store(false, Ordering::SeqCst);
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::AtomicU32;

  fn counting_sink() -> (Arc<AtomicU32>, Arc<dyn SessionSink>) {
    let count = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&count);
    let sink: Arc<dyn SessionSink> = Arc::new(move || {
      counter.fetch_add(1, Ordering::SeqCst);
    });
    (count, sink)
  }

  #[tokio::test]
  async fn test_concurrent_notifies_fire_once() {
    let (count, sink) = counting_sink();
    let guard = SessionGuard::new(sink);

    for _ in 0..5 {
      guard.notify();
    }

    assert_eq!(count.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_latch_resets_after_cooldown() {
    let (count, sink) = counting_sink();
    let guard = SessionGuard::new(sink).with_cooldown(Duration::from_millis(10));

    guard.notify();
    guard.notify();
    assert_eq!(count.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_millis(30)).await;

    guard.notify();
    assert_eq!(count.load(Ordering::SeqCst), 2);
  }
}
