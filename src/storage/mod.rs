//! Key-value storage adapters and scope dispatch.
//!
//! The cache persists serialized collections through a pair of injected
//! [`KeyValueStorage`] instances (one session-scoped, one durable) and a
//! per-call [`StorageScope`] selecting which of the pair an operation
//! touches.

mod memory;
mod scoped;
mod sqlite;

pub use memory::MemoryStorage;
pub use scoped::{ScopedStorage, StorageScope};
pub use sqlite::SqliteStorage;

use crate::error::StorageError;

/// A string-keyed storage medium.
///
/// Implementations are synchronous; the cache treats reads and writes as
/// plain calls, not async I/O.
pub trait KeyValueStorage: Send + Sync {
  /// The stored value, or `None` on a miss.
  fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

  /// Store `value` under `key`, replacing any previous value.
  fn save_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

  /// Remove a single entry. Removing a missing key is not an error.
  fn remove_item(&self, key: &str) -> Result<(), StorageError>;

  /// Remove every entry in this medium.
  fn clear(&self) -> Result<(), StorageError>;
}

/// Storage that doesn't persist anything.
/// Used when a scope slot should be inert - all operations are no-ops.
pub struct NoopStorage;

impl KeyValueStorage for NoopStorage {
  fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
    Ok(None) // Always miss
  }

  fn save_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
    Ok(()) // Discard
  }

  fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
    Ok(())
  }

  fn clear(&self) -> Result<(), StorageError> {
    Ok(())
  }
}
