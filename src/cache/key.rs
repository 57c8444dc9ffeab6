//! Stable cache keys for request identity.

use sha2::{Digest, Sha256};

/// Hash (method, path, query) into a stable, fixed-length key.
///
/// Query pairs are sorted first so parameter order never splits the cache.
pub fn request_key(method: &str, path: &str, query: &[(String, String)]) -> String {
  let mut pairs: Vec<&(String, String)> = query.iter().collect();
  pairs.sort();

  let mut input = format!("{}:{}", method, path);
  for (name, value) in pairs {
    input.push('&');
    input.push_str(name);
    input.push('=');
    input.push_str(value);
  }

  let mut hasher = Sha256::new();
  hasher.update(input.as_bytes());
  hex::encode(hasher.finalize())
}
