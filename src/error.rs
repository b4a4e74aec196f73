//! Error types for storage backends and persisted cache operations.

use thiserror::Error;

/// Failures raised by a [`KeyValueStorage`](crate::storage::KeyValueStorage)
/// backend.
#[derive(Debug, Error)]
pub enum StorageError {
  #[error("sqlite: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("io: {0}")]
  Io(#[from] std::io::Error),

  /// A storage mutex was poisoned by a panicking writer.
  #[error("storage lock poisoned")]
  Poisoned,
}

/// Failures surfaced by persisted cache operations.
///
/// The first five variants are expected, recoverable outcomes: callers get a
/// definite answer about why a mutation did not happen and how far a path
/// resolved. `Storage` and `Serde` wrap backend faults.
#[derive(Debug, Error)]
pub enum CacheError {
  /// Identity lookup found nothing, or the cached collection is absent.
  #[error("no cached record matched")]
  NotFound,

  /// A mutation was invoked with a zero-length path where a non-empty path
  /// is required.
  #[error("path is empty")]
  EmptyPath,

  /// A node path resolved fewer elements than requested. Carries how far
  /// resolution got so callers can decide whether to refetch.
  #[error("path resolved only {resolved} of {requested} segments")]
  PartialPath { resolved: usize, requested: usize },

  /// A parent resolved but its children did not contain the target record.
  #[error("target record not present in parent children")]
  ChildrenMismatch,

  /// The selected storage scope is `None`; nothing was read or written.
  #[error("storage scope is disabled")]
  StorageDisabled,

  #[error("storage backend: {0}")]
  Storage(#[from] StorageError),

  #[error("payload serialization: {0}")]
  Serde(#[from] serde_json::Error),
}
