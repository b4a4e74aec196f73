//! Cache-first fetch layer that orchestrates storage lookups with network
//! fetching.
//!
//! This layer sits between the application and its network client: a cached
//! collection is served straight from storage, a miss runs the caller's
//! fetcher and persists the result under the short key so the next call
//! hits.

use color_eyre::eyre::{eyre, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use tracing::debug;

use crate::storage::{ScopedStorage, StorageScope};

/// Indicates where fetched data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
  /// Served from cached storage without touching the network.
  Cache,
  /// Fresh data from the caller's fetcher.
  Network,
}

/// Result of a cache-first fetch, including where the data came from.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
  pub data: T,
  pub source: FetchSource,
}

impl<T> Fetched<T> {
  fn from_cache(data: T) -> Self {
    Self {
      data,
      source: FetchSource::Cache,
    }
  }

  fn from_network(data: T) -> Self {
    Self {
      data,
      source: FetchSource::Network,
    }
  }
}

/// Cache-first fetch layer over a [`ScopedStorage`] pair.
#[derive(Clone)]
pub struct FetchLayer {
  storage: ScopedStorage,
}

impl FetchLayer {
  pub fn new(storage: ScopedStorage) -> Self {
    Self { storage }
  }

  /// Fetch a collection with cache-first strategy.
  ///
  /// 1. No short key, or the resolved scope is disabled: fetch from the
  ///    network without reading or writing storage.
  /// 2. Cache hit: return the cached payload immediately.
  /// 3. Cache miss: run the fetcher and persist the result under the key.
  pub async fn cached_fetch<T, F, Fut>(
    &self,
    short_key: Option<&str>,
    scope: Option<StorageScope>,
    fetcher: F,
  ) -> Result<Fetched<T>>
  where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
  {
    let scope = self.storage.resolve(scope);
    let short_key = match short_key {
      Some(key) if scope != StorageScope::None => key,
      _ => {
        let data = fetcher().await?;
        return Ok(Fetched::from_network(data));
      }
    };

    if let Some(raw) = self
      .storage
      .get_item(short_key, scope)
      .map_err(|e| eyre!("cache read for {short_key}: {e}"))?
    {
      let data = serde_json::from_str(&raw)
        .map_err(|e| eyre!("cached payload for {short_key} is corrupt: {e}"))?;
      debug!(short_key, "serving cached payload");
      return Ok(Fetched::from_cache(data));
    }

    let data = fetcher().await?;
    let raw = serde_json::to_string(&data)?;
    self
      .storage
      .save_item(short_key, &raw, scope)
      .map_err(|e| eyre!("cache write for {short_key}: {e}"))?;
    debug!(short_key, "fetched and cached payload");
    Ok(Fetched::from_network(data))
  }

  /// Drop the cached payload for a key so the next fetch goes to the
  /// network.
  pub fn invalidate(&self, short_key: &str, scope: Option<StorageScope>) -> Result<()> {
    let scope = self.storage.resolve(scope);
    self
      .storage
      .remove_item(short_key, scope)
      .map_err(|e| eyre!("cache invalidation for {short_key}: {e}"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::CacheConfig;
  use serde_json::{json, Value};
  use std::sync::atomic::{AtomicUsize, Ordering};

  /// Install a test subscriber so `RUST_LOG=recache=debug` surfaces the
  /// layer's events when a test misbehaves.
  fn init_tracing() {
    let _ = tracing_subscriber::fmt()
      .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
      .with_test_writer()
      .try_init();
  }

  fn layer() -> FetchLayer {
    init_tracing();
    FetchLayer::new(ScopedStorage::in_memory(&CacheConfig::default()))
  }

  #[tokio::test]
  async fn test_miss_fetches_then_hit_serves_cache() {
    let layer = layer();
    let calls = AtomicUsize::new(0);
    let fetcher = || {
      calls.fetch_add(1, Ordering::SeqCst);
      async { Ok(json!([{"id": 1}])) }
    };

    let first = layer.cached_fetch(Some("issues"), None, fetcher).await.unwrap();
    assert_eq!(first.source, FetchSource::Network);

    let second: Fetched<Value> = layer
      .cached_fetch(Some("issues"), None, || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!([{"id": 2}]))
      })
      .await
      .unwrap();
    assert_eq!(second.source, FetchSource::Cache);
    assert_eq!(second.data, json!([{"id": 1}]));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_no_key_always_hits_network() {
    let layer = layer();
    for _ in 0..2 {
      let fetched: Fetched<Value> = layer
        .cached_fetch(None, None, || async { Ok(json!(1)) })
        .await
        .unwrap();
      assert_eq!(fetched.source, FetchSource::Network);
    }
  }

  #[tokio::test]
  async fn test_disabled_scope_bypasses_storage() {
    let config = CacheConfig {
      default_scope: StorageScope::None,
      ..CacheConfig::default()
    };
    init_tracing();
    let layer = FetchLayer::new(ScopedStorage::in_memory(&config));
    for _ in 0..2 {
      let fetched: Fetched<Value> = layer
        .cached_fetch(Some("issues"), None, || async { Ok(json!(1)) })
        .await
        .unwrap();
      assert_eq!(fetched.source, FetchSource::Network);
    }
  }

  #[tokio::test]
  async fn test_fetcher_error_propagates_and_caches_nothing() {
    let layer = layer();
    let result: Result<Fetched<Value>> = layer
      .cached_fetch(Some("issues"), None, || async { Err(eyre!("boom")) })
      .await;
    assert!(result.is_err());

    let fetched: Fetched<Value> = layer
      .cached_fetch(Some("issues"), None, || async { Ok(json!("ok")) })
      .await
      .unwrap();
    assert_eq!(fetched.source, FetchSource::Network);
  }

  #[tokio::test]
  async fn test_invalidate_forces_refetch() {
    let layer = layer();
    let _: Fetched<Value> = layer
      .cached_fetch(Some("issues"), None, || async { Ok(json!(1)) })
      .await
      .unwrap();
    layer.invalidate("issues", None).unwrap();
    let fetched: Fetched<Value> = layer
      .cached_fetch(Some("issues"), None, || async { Ok(json!(2)) })
      .await
      .unwrap();
    assert_eq!(fetched.source, FetchSource::Network);
    assert_eq!(fetched.data, json!(2));
  }
}
