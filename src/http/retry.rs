//! Retry policy for transient failures.
//!
//! Re-issues are bounded, exponential unless the server directs the wait,
//! and gated on idempotency: a POST without an explicit retry-safe marking
//! is never repeated, whatever the failure class.

use std::time::Duration;

use crate::error::ApiError;

/// Per-request attempt tracking. Travels with the request so concurrent
/// requests back off independently.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryState {
  attempt: u32,
}

impl RetryState {
  pub fn new() -> Self {
    Self::default()
  }

  /// Completed attempts so far (0 before the first try settles).
  pub fn attempt(&self) -> u32 {
    self.attempt
  }

  pub fn advance(&mut self) {
    self.attempt += 1;
  }
}

/// Retry verdict and delay computation.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
  max_attempts: u32,
  base_delay: Duration,
}

impl RetryPolicy {
  pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
    Self {
      max_attempts,
      base_delay,
    }
  }

  /// Whether another attempt may be issued for this failure.
  pub fn should_retry(&self, error: &ApiError, state: &RetryState, idempotent: bool) -> bool {
    if !idempotent {
      return false;
    }
    if state.attempt() + 1 >= self.max_attempts {
      return false;
    }
    error.is_transient()
  }

  /// How long to wait before the next attempt.
  pub fn delay_for(&self, error: &ApiError, state: &RetryState) -> Duration {
    match error {
      ApiError::RateLimited { retry_after, .. } => *retry_after,
      _ => exponential_backoff(state.attempt(), self.base_delay),
    }
  }
}

/// `base * 2^attempt`, saturating.
pub fn exponential_backoff(attempt: u32, base: Duration) -> Duration {
  base.saturating_mul(1u32 << attempt.min(16))
}

/// Interpret a `Retry-After` value in seconds; absence implies 60s.
pub fn parse_retry_after(seconds: Option<u64>) -> Duration {
  Duration::from_secs(seconds.unwrap_or(60))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::ErrorDetail;

  fn policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(500))
  }

  fn rate_limited(retry_after: Duration) -> ApiError {
    ApiError::RateLimited {
      retry_after,
      detail: ErrorDetail::new("RATE_LIMITED", "slow down"),
    }
  }

  #[test]
  fn test_transient_idempotent_failures_retry() {
    let state = RetryState::new();
    assert!(policy().should_retry(&ApiError::Network("reset".into()), &state, true));
    assert!(policy().should_retry(&ApiError::Timeout, &state, true));
    assert!(policy().should_retry(&rate_limited(Duration::from_secs(5)), &state, true));
  }

  #[test]
  fn test_non_idempotent_requests_never_retry() {
    let state = RetryState::new();
    assert!(!policy().should_retry(&ApiError::Network("reset".into()), &state, false));
    assert!(!policy().should_retry(&rate_limited(Duration::from_secs(1)), &state, false));
  }

  #[test]
  fn test_terminal_classes_never_retry() {
    let state = RetryState::new();
    let unauthorized = ApiError::Unauthorized {
      detail: ErrorDetail::unknown("expired"),
    };
    let not_found = ApiError::Client {
      status: 404,
      detail: ErrorDetail::new("NOT_FOUND", "no such agent"),
    };
    assert!(!policy().should_retry(&unauthorized, &state, true));
    assert!(!policy().should_retry(&not_found, &state, true));
  }

  #[test]
  fn test_attempt_cap() {
    let mut state = RetryState::new();
    let error = ApiError::Timeout;

    assert!(policy().should_retry(&error, &state, true));
    state.advance();
    assert!(policy().should_retry(&error, &state, true));
    state.advance();
    // Third attempt just failed; the bound is spent.
    assert!(!policy().should_retry(&error, &state, true));
  }

  #[test]
  fn test_server_directed_delay_wins() {
    let state = RetryState::new();
    let error = rate_limited(parse_retry_after(Some(5)));
    assert_eq!(policy().delay_for(&error, &state), Duration::from_secs(5));
  }

  #[test]
  fn test_retry_after_defaults_to_sixty_seconds() {
    assert_eq!(parse_retry_after(None), Duration::from_secs(60));
    assert_eq!(parse_retry_after(Some(7)), Duration::from_secs(7));
  }

  #[test]
  fn test_exponential_backoff_doubles() {
    let base = Duration::from_millis(100);
    assert_eq!(exponential_backoff(0, base), Duration::from_millis(100));
    assert_eq!(exponential_backoff(1, base), Duration::from_millis(200));
    assert_eq!(exponential_backoff(2, base), Duration::from_millis(400));
  }

  #[test]
  fn test_independent_backoff_counters() {
    let mut a = RetryState::new();
    let b = RetryState::new();
    a.advance();
    a.advance();
    assert_eq!(a.attempt(), 2);
    assert_eq!(b.attempt(), 0);
  }
}
