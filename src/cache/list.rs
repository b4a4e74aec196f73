//! Persisted cache over flat collections.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::CacheError;
use crate::list;
use crate::storage::{ScopedStorage, StorageScope};

/// Persisted flat-collection cache.
///
/// Collections are stored as plain JSON arrays under a short key. Identity
/// access is a per-call `key_of` closure, mirroring the in-memory mutator;
/// typed records pass [`Keyed::key`](crate::record::Keyed::key), dynamic
/// JSON records pass a closure over the configured identity field.
///
/// Every operation accepts an optional [`StorageScope`] override; `None`
/// uses the configured default. A resolved scope of `StorageScope::None`
/// fails with [`CacheError::StorageDisabled`] before any storage call.
#[derive(Clone)]
pub struct ListCache {
  storage: ScopedStorage,
}

impl ListCache {
  pub fn new(storage: ScopedStorage) -> Self {
    Self { storage }
  }

  pub fn storage(&self) -> &ScopedStorage {
    &self.storage
  }

  /// Resolve the effective scope, rejecting disabled storage up front.
  pub(crate) fn scope_for(&self, scope: Option<StorageScope>) -> Result<StorageScope, CacheError> {
    match self.storage.resolve(scope) {
      StorageScope::None => Err(CacheError::StorageDisabled),
      scope => Ok(scope),
    }
  }

  pub(crate) fn load<T: DeserializeOwned>(
    &self,
    short_key: &str,
    scope: StorageScope,
  ) -> Result<Option<Vec<T>>, CacheError> {
    match self.storage.get_item(short_key, scope)? {
      Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
      None => Ok(None),
    }
  }

  pub(crate) fn store<T: Serialize>(
    &self,
    short_key: &str,
    collection: &[T],
    scope: StorageScope,
  ) -> Result<(), CacheError> {
    let raw = serde_json::to_string(collection)?;
    self.storage.save_item(short_key, &raw, scope)?;
    Ok(())
  }

  /// Find one record by identity in the cached collection.
  pub fn find_one<T, K, F>(
    &self,
    short_key: &str,
    id: &K,
    key_of: F,
    scope: Option<StorageScope>,
  ) -> Result<Option<T>, CacheError>
  where
    T: DeserializeOwned,
    K: PartialEq,
    F: Fn(&T) -> Option<K>,
  {
    let scope = self.scope_for(scope)?;
    let mut collection: Vec<T> = match self.load(short_key, scope)? {
      Some(c) => c,
      None => return Ok(None),
    };
    match list::position_of(&collection, id, key_of) {
      Some(i) => {
        debug!(short_key, "cache hit");
        Ok(Some(collection.swap_remove(i)))
      }
      None => Ok(None),
    }
  }

  /// Find every record matching any of `ids`, preserving cached order.
  /// `Ok(None)` when nothing matched, never an empty vec.
  pub fn find_many<T, K, F>(
    &self,
    short_key: &str,
    ids: &[K],
    key_of: F,
    scope: Option<StorageScope>,
  ) -> Result<Option<Vec<T>>, CacheError>
  where
    T: DeserializeOwned,
    K: PartialEq,
    F: Fn(&T) -> Option<K>,
  {
    let scope = self.scope_for(scope)?;
    let collection: Vec<T> = match self.load(short_key, scope)? {
      Some(c) => c,
      None => return Ok(None),
    };
    let found: Vec<T> = collection
      .into_iter()
      .filter(|e| match key_of(e) {
        Some(k) => ids.contains(&k),
        None => false,
      })
      .collect();
    if found.is_empty() {
      Ok(None)
    } else {
      Ok(Some(found))
    }
  }

  /// Prepend a record, creating the collection on first write.
  pub fn on_add_one<T>(
    &self,
    short_key: &str,
    record: T,
    scope: Option<StorageScope>,
  ) -> Result<(), CacheError>
  where
    T: Serialize + DeserializeOwned,
  {
    let scope = self.scope_for(scope)?;
    let mut collection: Vec<T> = self.load(short_key, scope)?.unwrap_or_default();
    list::add_one(&mut collection, record);
    self.store(short_key, &collection, scope)?;
    debug!(short_key, len = collection.len(), "added one");
    Ok(())
  }

  /// Replace the first cached record matching `record`'s identity.
  /// Writes back only when the in-memory edit reports a change.
  pub fn on_edit_one<T, K, F>(
    &self,
    short_key: &str,
    record: &T,
    key_of: F,
    scope: Option<StorageScope>,
  ) -> Result<(), CacheError>
  where
    T: Clone + Serialize + DeserializeOwned,
    K: PartialEq,
    F: Fn(&T) -> Option<K>,
  {
    let scope = self.scope_for(scope)?;
    let mut collection: Vec<T> = self.load(short_key, scope)?.ok_or(CacheError::NotFound)?;
    if !list::edit_one(&mut collection, record, key_of) {
      return Err(CacheError::NotFound);
    }
    self.store(short_key, &collection, scope)
  }

  /// Batch edit: each input record replaces *every* cached match. Succeeds
  /// when at least one replacement occurred across the whole batch.
  pub fn on_edit_many<T, K, F>(
    &self,
    short_key: &str,
    records: &[T],
    key_of: F,
    scope: Option<StorageScope>,
  ) -> Result<(), CacheError>
  where
    T: Clone + Serialize + DeserializeOwned,
    K: PartialEq,
    F: Fn(&T) -> Option<K>,
  {
    let scope = self.scope_for(scope)?;
    let mut collection: Vec<T> = self.load(short_key, scope)?.ok_or(CacheError::NotFound)?;
    if !list::edit_many(&mut collection, records, key_of) {
      return Err(CacheError::NotFound);
    }
    self.store(short_key, &collection, scope)
  }

  /// Remove the first cached record whose identity equals `id`.
  pub fn on_del_one_by_id<T, K, F>(
    &self,
    short_key: &str,
    id: &K,
    key_of: F,
    scope: Option<StorageScope>,
  ) -> Result<(), CacheError>
  where
    T: Serialize + DeserializeOwned,
    K: PartialEq,
    F: Fn(&T) -> Option<K>,
  {
    let scope = self.scope_for(scope)?;
    let mut collection: Vec<T> = self.load(short_key, scope)?.ok_or(CacheError::NotFound)?;
    if !list::delete_one_by_id(&mut collection, id, key_of) {
      return Err(CacheError::NotFound);
    }
    self.store(short_key, &collection, scope)?;
    debug!(short_key, "deleted one");
    Ok(())
  }

  /// Derive the identity from `record` and delegate to [`Self::on_del_one_by_id`].
  pub fn on_del_one<T, K, F>(
    &self,
    short_key: &str,
    record: &T,
    key_of: F,
    scope: Option<StorageScope>,
  ) -> Result<(), CacheError>
  where
    T: Serialize + DeserializeOwned,
    K: PartialEq,
    F: Fn(&T) -> Option<K>,
  {
    let id = key_of(record).ok_or(CacheError::NotFound)?;
    self.on_del_one_by_id::<T, K, F>(short_key, &id, key_of, scope)
  }

  /// Remove every cached record matching any of `ids`.
  ///
  /// Succeeds whenever the cached collection existed non-empty, even if
  /// zero records matched; the write-back still happens with the scanned
  /// collection. This existence-based success is documented behavior.
  pub fn on_del_many_by_ids<T, K, F>(
    &self,
    short_key: &str,
    ids: &[K],
    key_of: F,
    scope: Option<StorageScope>,
  ) -> Result<(), CacheError>
  where
    T: Serialize + DeserializeOwned,
    K: PartialEq,
    F: Fn(&T) -> Option<K>,
  {
    let scope = self.scope_for(scope)?;
    let mut collection: Vec<T> = self.load(short_key, scope)?.ok_or(CacheError::NotFound)?;
    if !list::delete_many_by_ids(&mut collection, ids, key_of) {
      return Err(CacheError::NotFound);
    }
    self.store(short_key, &collection, scope)
  }

  /// Derive identities from `records` (skipping any without one) and
  /// delegate to [`Self::on_del_many_by_ids`].
  pub fn on_del_many<T, K, F>(
    &self,
    short_key: &str,
    records: &[T],
    key_of: F,
    scope: Option<StorageScope>,
  ) -> Result<(), CacheError>
  where
    T: Serialize + DeserializeOwned,
    K: PartialEq,
    F: Fn(&T) -> Option<K>,
  {
    let ids: Vec<K> = records.iter().filter_map(&key_of).collect();
    if ids.is_empty() {
      return Err(CacheError::NotFound);
    }
    self.on_del_many_by_ids::<T, K, _>(short_key, &ids, key_of, scope)
  }

  /// Remove one serialized collection from the selected media.
  pub fn evict(&self, short_key: &str, scope: Option<StorageScope>) -> Result<(), CacheError> {
    let scope = self.scope_for(scope)?;
    self.storage.remove_item(short_key, scope)?;
    debug!(short_key, "evicted");
    Ok(())
  }

  /// Clear every entry in the selected media.
  pub fn evict_all(&self, scope: Option<StorageScope>) -> Result<(), CacheError> {
    let scope = self.scope_for(scope)?;
    self.storage.clear(scope)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::CacheConfig;
  use crate::error::StorageError;
  use crate::storage::KeyValueStorage;
  use serde_json::{json, Value};
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;

  fn key(v: &Value) -> Option<Value> {
    v.get("_id").filter(|k| !k.is_null()).cloned()
  }

  fn cache() -> ListCache {
    ListCache::new(ScopedStorage::in_memory(&CacheConfig::default()))
  }

  #[test]
  fn test_add_creates_then_prepends() {
    let cache = cache();
    cache.on_add_one("notes", json!({"_id": "a"}), None).unwrap();
    cache.on_add_one("notes", json!({"_id": "b"}), None).unwrap();

    let raw = cache.storage().get_item("notes", StorageScope::Session).unwrap().unwrap();
    let stored: Vec<Value> = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored[0]["_id"], json!("b"));
    assert_eq!(stored[1]["_id"], json!("a"));
  }

  #[test]
  fn test_find_one_and_many() {
    let cache = cache();
    for id in ["a", "b", "c"] {
      cache.on_add_one("notes", json!({"_id": id}), None).unwrap();
    }

    let found: Value = cache.find_one("notes", &json!("b"), key, None).unwrap().unwrap();
    assert_eq!(found["_id"], json!("b"));
    assert!(cache.find_one::<Value, _, _>("notes", &json!("zz"), key, None).unwrap().is_none());

    let many: Vec<Value> = cache
      .find_many("notes", &[json!("c"), json!("a")], key, None)
      .unwrap()
      .unwrap();
    // Cached order (newest first), not query order.
    assert_eq!(many[0]["_id"], json!("c"));
    assert_eq!(many[1]["_id"], json!("a"));

    assert!(cache
      .find_many::<Value, _, _>("notes", &[json!("zz")], key, None)
      .unwrap()
      .is_none());
  }

  #[test]
  fn test_round_trip_preserves_order_and_structure() {
    let cache = cache();
    let records = vec![
      json!({"_id": "x", "nested": {"a": [1, 2, 3]}}),
      json!({"_id": "y", "flag": true}),
    ];
    for r in records.iter().rev() {
      cache.on_add_one("rt", r.clone(), None).unwrap();
    }
    let loaded: Vec<Value> = cache.load("rt", StorageScope::Session).unwrap().unwrap();
    assert_eq!(loaded, records);
  }

  #[test]
  fn test_edit_one_writes_back_only_on_change() {
    let cache = cache();
    cache.on_add_one("notes", json!({"_id": "a", "v": 1}), None).unwrap();

    cache.on_edit_one("notes", &json!({"_id": "a", "v": 2}), key, None).unwrap();
    let found: Value = cache.find_one("notes", &json!("a"), key, None).unwrap().unwrap();
    assert_eq!(found["v"], json!(2));

    let err = cache
      .on_edit_one("notes", &json!({"_id": "zz", "v": 9}), key, None)
      .unwrap_err();
    assert!(matches!(err, CacheError::NotFound));
  }

  #[test]
  fn test_edit_one_missing_collection() {
    let cache = cache();
    let err = cache
      .on_edit_one("nothing", &json!({"_id": "a"}), key, None)
      .unwrap_err();
    assert!(matches!(err, CacheError::NotFound));
  }

  #[test]
  fn test_edit_many_replaces_all_matches() {
    let cache = cache();
    cache
      .store(
        "dups",
        &[json!({"_id": 1, "v": 1}), json!({"_id": 1, "v": 2})],
        StorageScope::Session,
      )
      .unwrap();
    cache
      .on_edit_many("dups", &[json!({"_id": 1, "v": 9})], key, None)
      .unwrap();
    let loaded: Vec<Value> = cache.load("dups", StorageScope::Session).unwrap().unwrap();
    assert_eq!(loaded, vec![json!({"_id": 1, "v": 9}), json!({"_id": 1, "v": 9})]);
  }

  #[test]
  fn test_del_one_and_del_many_asymmetry() {
    let cache = cache();
    cache.on_add_one("notes", json!({"_id": "a"}), None).unwrap();

    // del-one on a missing id is NotFound.
    let err = cache
      .on_del_one_by_id::<Value, _, _>("notes", &json!("zz"), key, None)
      .unwrap_err();
    assert!(matches!(err, CacheError::NotFound));

    // del-many on a missing id succeeds because the collection existed.
    cache
      .on_del_many_by_ids::<Value, _, _>("notes", &[json!("zz")], key, None)
      .unwrap();
    let loaded: Vec<Value> = cache.load("notes", StorageScope::Session).unwrap().unwrap();
    assert_eq!(loaded.len(), 1);

    cache
      .on_del_one_by_id::<Value, _, _>("notes", &json!("a"), key, None)
      .unwrap();
    let loaded: Vec<Value> = cache.load("notes", StorageScope::Session).unwrap().unwrap();
    assert!(loaded.is_empty());
  }

  #[test]
  fn test_del_one_derives_id_from_record() {
    let cache = cache();
    cache.on_add_one("notes", json!({"_id": "a"}), None).unwrap();
    cache.on_del_one("notes", &json!({"_id": "a"}), key, None).unwrap();

    // A record without an identity is rejected before touching the list.
    let err = cache
      .on_del_one("notes", &json!({"name": "anon"}), key, None)
      .unwrap_err();
    assert!(matches!(err, CacheError::NotFound));
  }

  #[test]
  fn test_evict_single_key() {
    let cache = cache();
    cache.on_add_one("a", json!({"_id": 1}), None).unwrap();
    cache.on_add_one("b", json!({"_id": 2}), None).unwrap();
    cache.evict("a", None).unwrap();
    assert!(cache.find_one::<Value, _, _>("a", &json!(1), key, None).unwrap().is_none());
    assert!(cache.find_one::<Value, _, _>("b", &json!(2), key, None).unwrap().is_some());
  }

  #[test]
  fn test_evict_all() {
    let cache = cache();
    cache.on_add_one("a", json!({"_id": 1}), None).unwrap();
    cache.on_add_one("b", json!({"_id": 2}), None).unwrap();
    cache.evict_all(None).unwrap();
    assert!(cache.find_one::<Value, _, _>("a", &json!(1), key, None).unwrap().is_none());
    assert!(cache.find_one::<Value, _, _>("b", &json!(2), key, None).unwrap().is_none());
  }

  /// Storage spy that counts calls, for asserting short-circuits.
  struct CountingStorage {
    calls: AtomicUsize,
  }

  impl KeyValueStorage for CountingStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Ok(None)
    }

    fn save_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Ok(())
    }

    fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      Ok(())
    }
  }

  #[test]
  fn test_disabled_scope_short_circuits_before_storage() {
    let spy = Arc::new(CountingStorage {
      calls: AtomicUsize::new(0),
    });
    let config = CacheConfig {
      default_scope: StorageScope::None,
      ..CacheConfig::default()
    };
    let cache = ListCache::new(ScopedStorage::new(spy.clone(), spy.clone(), &config));

    assert!(matches!(
      cache.find_one::<Value, _, _>("k", &json!(1), key, None),
      Err(CacheError::StorageDisabled)
    ));
    assert!(matches!(
      cache.on_add_one("k", json!({"_id": 1}), None),
      Err(CacheError::StorageDisabled)
    ));
    assert!(matches!(
      cache.on_edit_one("k", &json!({"_id": 1}), key, None),
      Err(CacheError::StorageDisabled)
    ));
    assert!(matches!(
      cache.on_del_one_by_id::<Value, _, _>("k", &json!(1), key, None),
      Err(CacheError::StorageDisabled)
    ));
    assert!(matches!(cache.evict("k", None), Err(CacheError::StorageDisabled)));
    assert!(matches!(cache.evict_all(None), Err(CacheError::StorageDisabled)));

    // The adapter was never invoked.
    assert_eq!(spy.calls.load(Ordering::SeqCst), 0);

    // A per-call override re-enables storage.
    cache
      .on_add_one("k", json!({"_id": 1}), Some(StorageScope::Session))
      .unwrap();
    assert!(spy.calls.load(Ordering::SeqCst) > 0);
  }
}
