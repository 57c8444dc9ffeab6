//! In-memory response cache with a fixed freshness window.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// A memoized successful read response.
#[derive(Debug, Clone)]
struct CacheEntry {
  value: Value,
  cached_at: Instant,
}

/// Response cache keyed by request identity.
///
/// Entries live for a fixed TTL; an expired entry behaves as a miss and is
/// dropped on lookup. Writes never evict related reads — a PUT to
/// `/agents/3` leaves a cached `/agents` list alone until it ages out.
pub struct ResponseCache {
  entries: Mutex<HashMap<String, CacheEntry>>,
  ttl: Duration,
  volatile_paths: Vec<String>,
}

impl ResponseCache {
  pub fn new(ttl: Duration, volatile_paths: Vec<String>) -> Self {
    Self {
      entries: Mutex::new(HashMap::new()),
      ttl,
      volatile_paths,
    }
  }

  /// Admission predicate: only successful reads of non-volatile paths are
  /// cacheable, and the caller may opt a read out via the descriptor.
  pub fn admissible(&self, method: &str, path: &str, cache_override: Option<bool>) -> bool {
    if cache_override == Some(false) {
      return false;
    }
    method == "GET" && !self.is_volatile(path)
  }

  /// Paths in a volatile resource family are excluded regardless of method.
  pub fn is_volatile(&self, path: &str) -> bool {
    self.volatile_paths.iter().any(|p| path.starts_with(p.as_str()))
  }

  /// Fresh cached response for `key`, if any. Expired entries are removed.
  pub fn lookup(&self, key: &str) -> Option<Value> {
    let mut entries = self.entries.lock().expect("cache lock poisoned");

    match entries.get(key) {
      Some(entry) if entry.cached_at.elapsed() <= self.ttl => {
        debug!(key, "cache hit");
        Some(entry.value.clone())
      }
      Some(_) => {
        debug!(key, "cache entry expired");
        entries.remove(key);
        None
      }
      None => None,
    }
  }

  /// Record a successful response. The caller is expected to have checked
  /// `admissible` first.
  pub fn admit(&self, key: String, value: &Value) {
    debug!(key = %key, "cache admit");
    self
      .entries
      .lock()
      .expect("cache lock poisoned")
      .insert(
        key,
        CacheEntry {
          value: value.clone(),
          cached_at: Instant::now(),
        },
      );
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.entries.lock().expect("cache lock poisoned").len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn cache(ttl: Duration) -> ResponseCache {
    ResponseCache::new(
      ttl,
      vec![
        "/auth".to_string(),
        "/transactions".to_string(),
        "/virtual-cards".to_string(),
      ],
    )
  }

  #[test]
  fn test_lookup_within_ttl() {
    let cache = cache(Duration::from_secs(300));
    cache.admit("k1".to_string(), &json!({"id": 1}));

    assert_eq!(cache.lookup("k1"), Some(json!({"id": 1})));
    assert_eq!(cache.lookup("other"), None);
  }

  #[test]
  fn test_expired_entry_is_a_miss_and_dropped() {
    let cache = cache(Duration::ZERO);
    cache.admit("k1".to_string(), &json!([1, 2, 3]));

    std::thread::sleep(Duration::from_millis(5));
    assert_eq!(cache.lookup("k1"), None);
    assert_eq!(cache.len(), 0);
  }

  #[test]
  fn test_admission_predicate() {
    let cache = cache(Duration::from_secs(300));

    assert!(cache.admissible("GET", "/agents", None));
    assert!(!cache.admissible("POST", "/agents", None));
    assert!(!cache.admissible("GET", "/agents", Some(false)));

    // Volatile families are out regardless of method
    assert!(!cache.admissible("GET", "/auth/me", None));
    assert!(!cache.admissible("GET", "/transactions", None));
    assert!(!cache.admissible("GET", "/virtual-cards/7", None));
  }

  #[test]
  fn test_write_does_not_evict_cached_list() {
    let cache = cache(Duration::from_secs(300));
    cache.admit("agents-list".to_string(), &json!([{"id": 1}]));

    // A write to the same family leaves the list entry in place
    assert!(!cache.admissible("PUT", "/agents/1", None));
    assert_eq!(cache.lookup("agents-list"), Some(json!([{"id": 1}])));
  }
}
