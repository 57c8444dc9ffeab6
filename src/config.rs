//! Client configuration.
//!
//! All pipeline tuning lives here: base URL, timeout, retry bounds, cache
//! TTL, and the volatile-path denylist. Values are fixed at construction;
//! nothing is discovered at runtime.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("config file not found: {0}")]
  NotFound(PathBuf),

  #[error("failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    source: std::io::Error,
  },

  #[error("failed to parse config file {path}: {source}")]
  Parse {
    path: PathBuf,
    source: serde_yaml::Error,
  },

  #[error("invalid configuration: {0}")]
  Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
  /// Backend origin, e.g. "https://api.paydeck.dev/api/v1".
  pub base_url: String,

  /// Per-request timeout in seconds, enforced by the transport.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,

  /// Maximum attempts per request, first try included.
  #[serde(default = "default_max_attempts")]
  pub max_attempts: u32,

  /// Seed delay for exponential backoff, in milliseconds.
  #[serde(default = "default_retry_base_ms")]
  pub retry_base_ms: u64,

  /// How long a cached response stays fresh, in seconds.
  #[serde(default = "default_cache_ttl_secs")]
  pub cache_ttl_secs: u64,

  /// Path prefixes never admitted to the response cache. Auth, transaction
  /// and card endpoints must stay here: their freshness is safety-critical.
  #[serde(default = "default_volatile_paths")]
  pub volatile_paths: Vec<String>,
}

fn default_timeout_secs() -> u64 {
  10
}

fn default_max_attempts() -> u32 {
  3
}

fn default_retry_base_ms() -> u64 {
  500
}

fn default_cache_ttl_secs() -> u64 {
  300
}

fn default_volatile_paths() -> Vec<String> {
  vec![
    "/auth".to_string(),
    "/transactions".to_string(),
    "/virtual-cards".to_string(),
  ]
}

impl ClientConfig {
  /// Config with reference defaults for the given backend origin.
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into(),
      timeout_secs: default_timeout_secs(),
      max_attempts: default_max_attempts(),
      retry_base_ms: default_retry_base_ms(),
      cache_ttl_secs: default_cache_ttl_secs(),
      volatile_paths: default_volatile_paths(),
    }
  }

  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./paydeck.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/paydeck/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        p.to_path_buf()
      } else {
        return Err(ConfigError::NotFound(p.to_path_buf()));
      }
    } else {
      Self::find_config_file().ok_or_else(|| ConfigError::NotFound("paydeck.yaml".into()))?
    };

    Self::load_from_path(&path)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("paydeck.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("paydeck").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
      path: path.to_path_buf(),
      source: e,
    })?;

    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
      path: path.to_path_buf(),
      source: e,
    })
  }

  /// Validate the configuration and return the parsed base URL.
  pub fn validate(&self) -> Result<Url, ConfigError> {
    let url = Url::parse(&self.base_url)
      .map_err(|e| ConfigError::Invalid(format!("base_url '{}': {}", self.base_url, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
      return Err(ConfigError::Invalid(format!(
        "base_url must be http or https, got '{}'",
        url.scheme()
      )));
    }
    if self.max_attempts == 0 {
      return Err(ConfigError::Invalid("max_attempts must be at least 1".into()));
    }
    if self.timeout_secs == 0 {
      return Err(ConfigError::Invalid("timeout_secs must be non-zero".into()));
    }

    Ok(url)
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }

  pub fn retry_base_delay(&self) -> Duration {
    Duration::from_millis(self.retry_base_ms)
  }

  pub fn cache_ttl(&self) -> Duration {
    Duration::from_secs(self.cache_ttl_secs)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = ClientConfig::new("https://api.paydeck.dev/api/v1");
    assert_eq!(config.timeout(), Duration::from_secs(10));
    assert_eq!(config.max_attempts, 3);
    assert_eq!(config.cache_ttl(), Duration::from_secs(300));
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_rejects_bad_base_url() {
    let config = ClientConfig::new("ftp://api.paydeck.dev");
    assert!(config.validate().is_err());

    let config = ClientConfig::new("not a url");
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_rejects_zero_bounds() {
    let mut config = ClientConfig::new("https://api.paydeck.dev");
    config.max_attempts = 0;
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_parse_yaml_with_defaults() {
    let config: ClientConfig =
      serde_yaml::from_str("base_url: https://api.paydeck.dev/api/v1\nmax_attempts: 5\n").unwrap();
    assert_eq!(config.max_attempts, 5);
    assert_eq!(config.timeout_secs, 10);
    assert_eq!(config.volatile_paths.len(), 3);
  }
}
