//! Bearer-token credential store.
//!
//! The store is explicitly constructed and injected into the pipeline; auth
//! flows write it, the request annotator reads it on every call. Reads never
//! fail: a backing-store error falls back to an in-process slot that is
//! updated on every write, so one bad storage backend never loses the
//! credential for the rest of the process lifetime.

use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
  #[error("credential storage unavailable: {0}")]
  Unavailable(String),

  #[error("credential storage io error: {0}")]
  Io(String),
}

/// Trait for credential storage backends.
pub trait CredentialStorage: Send + Sync {
  /// Read the stored token, if any.
  fn load(&self) -> Result<Option<String>, StorageError>;

  /// Persist the token.
  fn save(&self, token: &str) -> Result<(), StorageError>;

  /// Remove the stored token.
  fn clear(&self) -> Result<(), StorageError>;
}

/// Storage backend that keeps the token in process memory only.
#[derive(Default)]
pub struct MemoryStorage {
  slot: Mutex<Option<String>>,
}

impl CredentialStorage for MemoryStorage {
  fn load(&self) -> Result<Option<String>, StorageError> {
    Ok(lock_slot(&self.slot).clone())
  }

  fn save(&self, token: &str) -> Result<(), StorageError> {
    *lock_slot(&self.slot) = Some(token.to_string());
    Ok(())
  }

  fn clear(&self) -> Result<(), StorageError> {
    *lock_slot(&self.slot) = None;
    Ok(())
  }
}

// The store must keep working even if a panic elsewhere poisoned the lock.
fn lock_slot(slot: &Mutex<Option<String>>) -> std::sync::MutexGuard<'_, Option<String>> {
  slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// File-backed storage so a login survives process restarts.
pub struct FileStorage {
  path: PathBuf,
}

impl FileStorage {
  /// Storage at the default location under the user config directory.
  pub fn open() -> Result<Self, StorageError> {
    let config_dir = dirs::config_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".config")))
      .ok_or_else(|| StorageError::Unavailable("could not determine config directory".into()))?;

    Ok(Self::at(config_dir.join("paydeck").join("token")))
  }

  /// Storage at an explicit path.
  pub fn at(path: PathBuf) -> Self {
    Self { path }
  }
}

impl CredentialStorage for FileStorage {
  fn load(&self) -> Result<Option<String>, StorageError> {
    match std::fs::read_to_string(&self.path) {
      Ok(contents) => {
        let token = contents.trim();
        if token.is_empty() {
          Ok(None)
        } else {
          Ok(Some(token.to_string()))
        }
      }
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(StorageError::Io(format!("{}: {}", self.path.display(), e))),
    }
  }

  fn save(&self, token: &str) -> Result<(), StorageError> {
    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| StorageError::Io(format!("{}: {}", parent.display(), e)))?;
    }
    std::fs::write(&self.path, token)
      .map_err(|e| StorageError::Io(format!("{}: {}", self.path.display(), e)))
  }

  fn clear(&self) -> Result<(), StorageError> {
    match std::fs::remove_file(&self.path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(StorageError::Io(format!("{}: {}", self.path.display(), e))),
    }
  }
}

/// Authoritative holder of the current bearer token.
///
/// At most one credential is authoritative at a time; `set` supersedes the
/// previous token and is visible to the next `get` immediately.
pub struct CredentialStore {
  storage: Box<dyn CredentialStorage>,
  // Updated on every set/clear whether or not the backing store succeeds.
  fallback: Mutex<Option<String>>,
}

impl CredentialStore {
  pub fn new(storage: Box<dyn CredentialStorage>) -> Self {
    Self {
      storage,
      fallback: Mutex::new(None),
    }
  }

  /// Store backed by process memory only.
  pub fn in_memory() -> Self {
    Self::new(Box::new(MemoryStorage::default()))
  }

  /// Current token. Never fails; a backing-store error serves the fallback.
  pub fn get(&self) -> Option<String> {
    match self.storage.load() {
      Ok(Some(token)) => Some(token),
      Ok(None) => lock_slot(&self.fallback).clone(),
      Err(e) => {
        warn!(error = %e, "credential storage read failed, using memory fallback");
        lock_slot(&self.fallback).clone()
      }
    }
  }

  /// Replace the current token. Idempotent.
  pub fn set(&self, token: &str) {
    *lock_slot(&self.fallback) = Some(token.to_string());
    if let Err(e) = self.storage.save(token) {
      warn!(error = %e, "credential storage write failed, token kept in memory");
    }
  }

  /// Drop the current token. Idempotent.
  pub fn clear(&self) {
    *lock_slot(&self.fallback) = None;
    if let Err(e) = self.storage.clear() {
      warn!(error = %e, "credential storage clear failed");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Backend that fails every operation, for fallback coverage.
  struct BrokenStorage;

  impl CredentialStorage for BrokenStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
      Err(StorageError::Unavailable("broken".into()))
    }

    fn save(&self, _token: &str) -> Result<(), StorageError> {
      Err(StorageError::Unavailable("broken".into()))
    }

    fn clear(&self) -> Result<(), StorageError> {
      Err(StorageError::Unavailable("broken".into()))
    }
  }

  #[test]
  fn test_round_trip() {
    let store = CredentialStore::in_memory();
    assert_eq!(store.get(), None);

    store.set("tok-123");
    assert_eq!(store.get(), Some("tok-123".to_string()));

    store.clear();
    assert_eq!(store.get(), None);
  }

  #[test]
  fn test_set_supersedes() {
    let store = CredentialStore::in_memory();
    store.set("first");
    store.set("second");
    assert_eq!(store.get(), Some("second".to_string()));
  }

  #[test]
  fn test_broken_storage_falls_back_to_memory() {
    let store = CredentialStore::new(Box::new(BrokenStorage));

    store.set("tok-456");
    assert_eq!(store.get(), Some("tok-456".to_string()));

    store.clear();
    assert_eq!(store.get(), None);
  }

  #[test]
  fn test_file_storage_round_trip() {
    let path = std::env::temp_dir()
      .join("paydeck-test")
      .join(format!("token-{}", uuid::Uuid::new_v4()));
    let storage = FileStorage::at(path.clone());

    assert_eq!(storage.load().unwrap(), None);
    storage.save("tok-789").unwrap();
    assert_eq!(storage.load().unwrap(), Some("tok-789".to_string()));
    storage.clear().unwrap();
    assert_eq!(storage.load().unwrap(), None);

    // Clearing an already-missing file is fine
    storage.clear().unwrap();
    let _ = std::fs::remove_dir_all(path.parent().unwrap());
  }
}
