//! Scope selection over a session/durable storage pair.

use serde::Deserialize;
use std::sync::Arc;

use super::{KeyValueStorage, MemoryStorage, SqliteStorage};
use crate::config::CacheConfig;
use crate::error::StorageError;

/// Which storage medium an operation touches.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageScope {
  /// Storage disabled: reads miss, writes are rejected by the cache layer.
  None,
  /// Session-scoped medium only.
  #[default]
  Session,
  /// Durable-local medium only.
  Local,
  /// Read through session falling back to local (backfilling session on a
  /// fallback hit); write through to both.
  Both,
}

/// The injected session/durable storage pair plus the key namespace.
///
/// Cheap to clone; both media are shared behind `Arc`. All keys passing
/// through here are short keys; the configured prefix is applied before
/// any medium is touched.
#[derive(Clone)]
pub struct ScopedStorage {
  session: Arc<dyn KeyValueStorage>,
  local: Arc<dyn KeyValueStorage>,
  key_prefix: String,
  default_scope: StorageScope,
}

impl ScopedStorage {
  /// Build from explicit media instances.
  pub fn new(
    session: Arc<dyn KeyValueStorage>,
    local: Arc<dyn KeyValueStorage>,
    config: &CacheConfig,
  ) -> Self {
    Self {
      session,
      local,
      key_prefix: config.key_prefix.clone(),
      default_scope: config.default_scope,
    }
  }

  /// Both media in memory. Nothing survives the process; useful for tests
  /// and for callers that only want session semantics.
  pub fn in_memory(config: &CacheConfig) -> Self {
    Self::new(
      Arc::new(MemoryStorage::new()),
      Arc::new(MemoryStorage::new()),
      config,
    )
  }

  /// The standard pairing: in-memory session medium, SQLite durable medium
  /// at the default path.
  pub fn open_default(config: &CacheConfig) -> Result<Self, StorageError> {
    Ok(Self::new(
      Arc::new(MemoryStorage::new()),
      Arc::new(SqliteStorage::open()?),
      config,
    ))
  }

  /// The configured default scope, used when a call passes no override.
  pub fn default_scope(&self) -> StorageScope {
    self.default_scope
  }

  /// Resolve a per-call scope override against the configured default.
  pub fn resolve(&self, scope: Option<StorageScope>) -> StorageScope {
    scope.unwrap_or(self.default_scope)
  }

  /// Expand a short key to the full storage key.
  pub fn full_key(&self, short_key: &str) -> String {
    format!("{}{}", self.key_prefix, short_key)
  }

  pub fn get_item(&self, short_key: &str, scope: StorageScope) -> Result<Option<String>, StorageError> {
    let key = self.full_key(short_key);
    match scope {
      StorageScope::None => Ok(None),
      StorageScope::Session => self.session.get_item(&key),
      StorageScope::Local => self.local.get_item(&key),
      StorageScope::Both => {
        if let Some(v) = self.session.get_item(&key)? {
          return Ok(Some(v));
        }
        match self.local.get_item(&key)? {
          Some(v) => {
            // Fallback hit: backfill the session medium.
            self.session.save_item(&key, &v)?;
            Ok(Some(v))
          }
          None => Ok(None),
        }
      }
    }
  }

  pub fn save_item(&self, short_key: &str, value: &str, scope: StorageScope) -> Result<(), StorageError> {
    let key = self.full_key(short_key);
    match scope {
      StorageScope::None => Ok(()),
      StorageScope::Session => self.session.save_item(&key, value),
      StorageScope::Local => self.local.save_item(&key, value),
      StorageScope::Both => {
        self.session.save_item(&key, value)?;
        self.local.save_item(&key, value)
      }
    }
  }

  pub fn remove_item(&self, short_key: &str, scope: StorageScope) -> Result<(), StorageError> {
    let key = self.full_key(short_key);
    match scope {
      StorageScope::None => Ok(()),
      StorageScope::Session => self.session.remove_item(&key),
      StorageScope::Local => self.local.remove_item(&key),
      StorageScope::Both => {
        self.session.remove_item(&key)?;
        self.local.remove_item(&key)
      }
    }
  }

  pub fn clear(&self, scope: StorageScope) -> Result<(), StorageError> {
    match scope {
      StorageScope::None => Ok(()),
      StorageScope::Session => self.session.clear(),
      StorageScope::Local => self.local.clear(),
      StorageScope::Both => {
        self.session.clear()?;
        self.local.clear()
      }
    }
  }
}
