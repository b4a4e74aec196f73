//! SQLite-backed storage, the durable-local medium.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::KeyValueStorage;
use crate::error::StorageError;

/// Schema for the key-value table.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS cache_entries (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// Durable key-value storage backed by SQLite.
///
/// Entries survive process restarts, mirroring browser `localStorage`.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open or create the database at the default location
  /// (`<data dir>/recache/cache.db`).
  pub fn open() -> Result<Self, StorageError> {
    Self::open_at(&Self::default_path()?)
  }

  /// Open or create a database at an explicit path.
  pub fn open_at(path: &Path) -> Result<Self, StorageError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)?;
    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;
    Ok(storage)
  }

  /// Open a private in-memory database. Durable in name only, handy for
  /// tests and for running without filesystem access.
  pub fn open_in_memory() -> Result<Self, StorageError> {
    let conn = Connection::open_in_memory()?;
    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;
    Ok(storage)
  }

  fn default_path() -> Result<PathBuf, StorageError> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| {
        StorageError::Io(std::io::Error::new(
          std::io::ErrorKind::NotFound,
          "could not determine data directory",
        ))
      })?;

    Ok(data_dir.join("recache").join("cache.db"))
  }

  fn run_migrations(&self) -> Result<(), StorageError> {
    let conn = self.lock()?;
    conn.execute_batch(SCHEMA)?;
    Ok(())
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StorageError> {
    self.conn.lock().map_err(|_| StorageError::Poisoned)
  }
}

impl KeyValueStorage for SqliteStorage {
  fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
    let conn = self.lock()?;
    let value = conn
      .query_row(
        "SELECT value FROM cache_entries WHERE key = ?",
        params![key],
        |row| row.get(0),
      )
      .optional()?;
    Ok(value)
  }

  fn save_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
    let conn = self.lock()?;
    conn.execute(
      "INSERT OR REPLACE INTO cache_entries (key, value, cached_at)
       VALUES (?, ?, datetime('now'))",
      params![key, value],
    )?;
    Ok(())
  }

  fn remove_item(&self, key: &str) -> Result<(), StorageError> {
    let conn = self.lock()?;
    conn.execute("DELETE FROM cache_entries WHERE key = ?", params![key])?;
    Ok(())
  }

  fn clear(&self) -> Result<(), StorageError> {
    let conn = self.lock()?;
    conn.execute("DELETE FROM cache_entries", [])?;
    Ok(())
  }
}
