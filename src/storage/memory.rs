//! In-memory storage, the session-scoped medium.

use std::collections::HashMap;
use std::sync::Mutex;

use super::KeyValueStorage;
use crate::error::StorageError;

/// Process-lifetime key-value storage backed by a `HashMap`.
///
/// This is the session-scoped medium: entries live as long as the owning
/// application context and vanish with it.
#[derive(Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
    self.entries.lock().map_err(|_| StorageError::Poisoned)
  }
}

impl KeyValueStorage for MemoryStorage {
  fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
    Ok(self.lock()?.get(key).cloned())
  }

  fn save_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
    self.lock()?.insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove_item(&self, key: &str) -> Result<(), StorageError> {
    self.lock()?.remove(key);
    Ok(())
  }

  fn clear(&self) -> Result<(), StorageError> {
    self.lock()?.clear();
    Ok(())
  }
}
