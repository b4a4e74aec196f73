//! In-memory tree mutation through fully-resolved index paths.
//!
//! Every operation verifies resolution first and mutates second, so a
//! failed call leaves the tree exactly as it was; there is no partial
//! splice to undo.

use tracing::warn;

use super::model::TreeModel;
use super::resolve::{elements_along, node_at_mut, resolve_path};
use crate::error::CacheError;
use crate::list;

/// Insert `record` under the node located by `parent_path`.
///
/// An empty `parent_path` inserts at root level with flat-list prepend
/// semantics. Otherwise the parent path must resolve fully: zero resolved
/// segments report `NotFound`, a shorter resolution reports `PartialPath`.
///
/// `relation_hook` runs after resolution and *before* the record is
/// attached, receiving the resolved parent path (root first) and the
/// record. This is where callers recompute denormalized ancestry fields so
/// the record carries them at attachment time.
pub fn add_node<M: TreeModel>(
  model: &M,
  roots: &mut Vec<M::Node>,
  mut record: M::Node,
  parent_path: &[M::Key],
  relation_hook: Option<&mut dyn FnMut(&[&M::Node], &mut M::Node)>,
) -> Result<(), CacheError> {
  if parent_path.is_empty() {
    list::add_one(roots, record);
    return Ok(());
  }

  let indices = resolve_path(model, roots, parent_path);
  require_full(&indices, parent_path.len())?;

  if let Some(hook) = relation_hook {
    let elems = elements_along(model, roots, &indices);
    hook(&elems, &mut record);
  }

  let parent = node_at_mut(model, roots, &indices).ok_or(CacheError::NotFound)?;
  match model.children_mut(parent) {
    Some(children) => children.push(record),
    None => model.set_children(parent, vec![record]),
  }
  Ok(())
}

/// Replace the node located by `self_path` with `record`.
///
/// A length-1 path edits a root-level record via the flat mutator. Deeper
/// paths must resolve fully; the target is then re-matched inside its
/// parent's children by the record's own identity; if it is absent there,
/// the tree is inconsistent with the path and `ChildrenMismatch` is
/// reported without mutation.
pub fn edit_node<M: TreeModel>(
  model: &M,
  roots: &mut Vec<M::Node>,
  record: M::Node,
  self_path: &[M::Key],
) -> Result<(), CacheError> {
  if self_path.is_empty() {
    return Err(CacheError::EmptyPath);
  }
  if self_path.len() == 1 {
    if list::edit_one(roots, &record, |n| model.key_of(n)) {
      return Ok(());
    }
    return Err(CacheError::NotFound);
  }

  let indices = resolve_path(model, roots, self_path);
  require_full(&indices, self_path.len())?;

  let id = model.key_of(&record).ok_or(CacheError::NotFound)?;
  let parent = node_at_mut(model, roots, &indices[..indices.len() - 1])
    .ok_or(CacheError::NotFound)?;
  let children = model.children_mut(parent).ok_or(CacheError::ChildrenMismatch)?;
  let pos = children
    .iter()
    .position(|c| model.key_of(c).as_ref() == Some(&id));
  match pos {
    Some(i) => {
      children[i] = record;
      Ok(())
    }
    None => {
      warn!(id = ?id, "resolved parent does not contain the target record");
      Err(CacheError::ChildrenMismatch)
    }
  }
}

/// Remove the node located by `self_path`.
///
/// A length-1 path deletes a root-level record by the path's identity
/// segment. Deeper paths must resolve fully; `relation_hook` runs before
/// detachment with the resolved element path (root first, target last), the
/// symmetry point to [`add_node`]'s hook.
pub fn delete_node<M: TreeModel>(
  model: &M,
  roots: &mut Vec<M::Node>,
  record: &M::Node,
  self_path: &[M::Key],
  relation_hook: Option<&mut dyn FnMut(&[&M::Node])>,
) -> Result<(), CacheError> {
  if self_path.is_empty() {
    return Err(CacheError::EmptyPath);
  }
  if self_path.len() == 1 {
    if list::delete_one_by_id(roots, &self_path[0], |n| model.key_of(n)) {
      return Ok(());
    }
    return Err(CacheError::NotFound);
  }

  let indices = resolve_path(model, roots, self_path);
  require_full(&indices, self_path.len())?;

  if let Some(hook) = relation_hook {
    let elems = elements_along(model, roots, &indices);
    hook(&elems);
  }

  let id = model.key_of(record).ok_or(CacheError::NotFound)?;
  let parent = node_at_mut(model, roots, &indices[..indices.len() - 1])
    .ok_or(CacheError::NotFound)?;
  let children = model.children_mut(parent).ok_or(CacheError::ChildrenMismatch)?;
  let pos = children
    .iter()
    .position(|c| model.key_of(c).as_ref() == Some(&id));
  match pos {
    Some(i) => {
      children.remove(i);
      Ok(())
    }
    None => {
      warn!(id = ?id, "resolved parent does not contain the target record");
      Err(CacheError::ChildrenMismatch)
    }
  }
}

fn require_full(indices: &[usize], requested: usize) -> Result<(), CacheError> {
  if indices.is_empty() {
    Err(CacheError::NotFound)
  } else if indices.len() != requested {
    Err(CacheError::PartialPath {
      resolved: indices.len(),
      requested,
    })
  } else {
    Ok(())
  }
}
