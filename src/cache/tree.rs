//! Persisted cache over tree-shaped collections.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::ListCache;
use crate::error::CacheError;
use crate::storage::{ScopedStorage, StorageScope};
use crate::tree::{self, TreeModel};

/// Persisted tree cache.
///
/// Same persistence contract as [`ListCache`] (a JSON array of root
/// records under a short key), but records may nest children, and records
/// are located by node paths. Root-level operations delegate to the flat
/// mutator; deeper operations resolve the path against the freshly
/// deserialized tree, mutate through it, and write the whole root
/// collection back in a single save.
#[derive(Clone)]
pub struct TreeCache {
  list: ListCache,
}

impl TreeCache {
  pub fn new(storage: ScopedStorage) -> Self {
    Self {
      list: ListCache::new(storage),
    }
  }

  /// The flat-cache view over the same storage, for root-level collections.
  pub fn list(&self) -> &ListCache {
    &self.list
  }

  fn load_tree<N: DeserializeOwned>(
    &self,
    short_key: &str,
    scope: StorageScope,
  ) -> Result<Vec<N>, CacheError> {
    self.list.load(short_key, scope)?.ok_or(CacheError::NotFound)
  }

  /// Resolve a node path against the cached tree, returning the element
  /// path (root first) as owned nodes.
  ///
  /// Resolution truncates silently: the result can be shorter than `path`,
  /// and callers compare lengths to detect partial resolution.
  pub fn elements_by_path<M>(
    &self,
    model: &M,
    short_key: &str,
    path: &[M::Key],
    scope: Option<StorageScope>,
  ) -> Result<Vec<M::Node>, CacheError>
  where
    M: TreeModel,
    M::Node: DeserializeOwned,
  {
    if path.is_empty() {
      return Err(CacheError::EmptyPath);
    }
    let scope = self.list.scope_for(scope)?;
    let roots: Vec<M::Node> = self.load_tree(short_key, scope)?;
    let indices = tree::resolve_path(model, &roots, path);
    Ok(
      tree::elements_along(model, &roots, &indices)
        .into_iter()
        .cloned()
        .collect(),
    )
  }

  /// First root-to-node path whose leaf matches `id`, as owned nodes
  /// (root first), or `Ok(None)` if the id is nowhere in the cached tree.
  pub fn find_one_path<M>(
    &self,
    model: &M,
    short_key: &str,
    id: &M::Key,
    scope: Option<StorageScope>,
  ) -> Result<Option<Vec<M::Node>>, CacheError>
  where
    M: TreeModel,
    M::Node: DeserializeOwned,
  {
    let scope = self.list.scope_for(scope)?;
    let roots: Vec<M::Node> = self.load_tree(short_key, scope)?;
    Ok(tree::find_one_path(model, &roots, id).map(|indices| {
      tree::elements_along(model, &roots, &indices)
        .into_iter()
        .cloned()
        .collect()
    }))
  }

  /// Every root-to-node path whose leaf matches `id` (root first).
  pub fn find_all_paths<M>(
    &self,
    model: &M,
    short_key: &str,
    id: &M::Key,
    scope: Option<StorageScope>,
  ) -> Result<Vec<Vec<M::Node>>, CacheError>
  where
    M: TreeModel,
    M::Node: DeserializeOwned,
  {
    let scope = self.list.scope_for(scope)?;
    let roots: Vec<M::Node> = self.load_tree(short_key, scope)?;
    Ok(
      tree::find_all_paths(model, &roots, id)
        .into_iter()
        .map(|indices| {
          tree::elements_along(model, &roots, &indices)
            .into_iter()
            .cloned()
            .collect()
        })
        .collect(),
    )
  }

  /// Insert a record under the parent located by `parent_path` and persist.
  ///
  /// An empty parent path prepends at root level, creating the collection
  /// on first write. `relation_hook` runs before attachment; see
  /// [`tree::add_node`].
  pub fn on_add_one<M>(
    &self,
    model: &M,
    short_key: &str,
    record: M::Node,
    parent_path: &[M::Key],
    relation_hook: Option<&mut dyn FnMut(&[&M::Node], &mut M::Node)>,
    scope: Option<StorageScope>,
  ) -> Result<(), CacheError>
  where
    M: TreeModel,
    M::Node: Serialize + DeserializeOwned,
  {
    let scope = self.list.scope_for(scope)?;
    let mut roots: Vec<M::Node> = if parent_path.is_empty() {
      // Root-level add creates the collection on first write.
      self.list.load(short_key, scope)?.unwrap_or_default()
    } else {
      self.load_tree(short_key, scope)?
    };
    tree::add_node(model, &mut roots, record, parent_path, relation_hook)?;
    self.list.store(short_key, &roots, scope)?;
    debug!(short_key, depth = parent_path.len(), "tree add persisted");
    Ok(())
  }

  /// Replace the record located by `self_path` and persist.
  pub fn on_edit_one<M>(
    &self,
    model: &M,
    short_key: &str,
    record: M::Node,
    self_path: &[M::Key],
    scope: Option<StorageScope>,
  ) -> Result<(), CacheError>
  where
    M: TreeModel,
    M::Node: Serialize + DeserializeOwned,
  {
    if self_path.is_empty() {
      return Err(CacheError::EmptyPath);
    }
    let scope = self.list.scope_for(scope)?;
    let mut roots: Vec<M::Node> = self.load_tree(short_key, scope)?;
    tree::edit_node(model, &mut roots, record, self_path)?;
    self.list.store(short_key, &roots, scope)?;
    debug!(short_key, depth = self_path.len(), "tree edit persisted");
    Ok(())
  }

  /// Remove the record located by `self_path` and persist.
  ///
  /// `relation_hook` runs before detachment; see [`tree::delete_node`].
  pub fn on_del_one<M>(
    &self,
    model: &M,
    short_key: &str,
    record: &M::Node,
    self_path: &[M::Key],
    relation_hook: Option<&mut dyn FnMut(&[&M::Node])>,
    scope: Option<StorageScope>,
  ) -> Result<(), CacheError>
  where
    M: TreeModel,
    M::Node: Serialize + DeserializeOwned,
  {
    if self_path.is_empty() {
      return Err(CacheError::EmptyPath);
    }
    let scope = self.list.scope_for(scope)?;
    let mut roots: Vec<M::Node> = self.load_tree(short_key, scope)?;
    tree::delete_node(model, &mut roots, record, self_path, relation_hook)?;
    self.list.store(short_key, &roots, scope)?;
    debug!(short_key, depth = self_path.len(), "tree delete persisted");
    Ok(())
  }
}
