use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::storage::StorageScope;

/// Process-wide cache defaults.
///
/// Every field has a sensible default, so plain `CacheConfig::default()`
/// works for programmatic use. The struct also deserializes from YAML for
/// applications that prefer a config file.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Record field holding the identity value for dynamic JSON records.
  #[serde(default = "default_id_field")]
  pub id_field: String,

  /// Record field holding nested child records for dynamic JSON trees.
  #[serde(default = "default_children_field")]
  pub children_field: String,

  /// Namespace prefix applied to every short key before it reaches storage.
  #[serde(default)]
  pub key_prefix: String,

  /// Storage scope used when an operation does not override it.
  #[serde(default)]
  pub default_scope: StorageScope,
}

fn default_id_field() -> String {
  "_id".to_string()
}

fn default_children_field() -> String {
  "children".to_string()
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      id_field: default_id_field(),
      children_field: default_children_field(),
      key_prefix: String::new(),
      default_scope: StorageScope::default(),
    }
  }
}

impl CacheConfig {
  /// Load configuration from file, falling back to defaults when no file
  /// exists.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./recache.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/recache/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("recache.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("recache").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: CacheConfig = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }
}
