//! Path resolution and search over tree collections.

use tracing::debug;

use super::model::TreeModel;

/// Resolve a node path (sequence of identity values) to an index path.
///
/// Walks `path` left to right: each segment is looked up in the current
/// candidate level (first match in sibling order), then the walk descends
/// into that node's children. A segment with no match silently truncates
/// the walk; the indices resolved so far are returned, never an error.
/// Callers distinguish full from partial resolution by comparing
/// `result.len()` with `path.len()`.
pub fn resolve_path<M: TreeModel>(model: &M, roots: &[M::Node], path: &[M::Key]) -> Vec<usize> {
  let mut indices = Vec::with_capacity(path.len());
  let mut level = roots;
  for segment in path {
    let found = level
      .iter()
      .position(|n| model.key_of(n).as_ref() == Some(segment));
    match found {
      Some(i) => {
        let node = &level[i];
        indices.push(i);
        level = model.children(node).unwrap_or(&[]);
      }
      None => {
        debug!(resolved = indices.len(), requested = path.len(), "path segment not found");
        break;
      }
    }
  }
  indices
}

/// The node an index path points at, or `None` if any index is out of range.
pub fn node_at<'a, M: TreeModel>(
  model: &M,
  roots: &'a [M::Node],
  indices: &[usize],
) -> Option<&'a M::Node> {
  let (&first, rest) = indices.split_first()?;
  let mut node = roots.get(first)?;
  for &i in rest {
    node = model.children(node)?.get(i)?;
  }
  Some(node)
}

/// Mutable variant of [`node_at`].
pub fn node_at_mut<'a, M: TreeModel>(
  model: &M,
  roots: &'a mut [M::Node],
  indices: &[usize],
) -> Option<&'a mut M::Node> {
  let (&first, rest) = indices.split_first()?;
  let mut node = roots.get_mut(first)?;
  for &i in rest {
    node = model.children_mut(node)?.get_mut(i)?;
  }
  Some(node)
}

/// Materialize an index path as node references, root first.
///
/// Stops early if an index no longer points at a node, so the result can be
/// shorter than `indices` when the tree changed since resolution.
pub fn elements_along<'a, M: TreeModel>(
  model: &M,
  roots: &'a [M::Node],
  indices: &[usize],
) -> Vec<&'a M::Node> {
  let mut out = Vec::with_capacity(indices.len());
  let mut level = roots;
  for &i in indices {
    match level.get(i) {
      Some(node) => {
        out.push(node);
        level = model.children(node).unwrap_or(&[]);
      }
      None => break,
    }
  }
  out
}

/// Depth-first search for the first node whose identity equals `id`.
///
/// Each node is checked before its children; siblings are visited in array
/// order; the first hit wins and the search stops. Returns the root-first
/// index path of the match. Even if duplicates exist elsewhere in the tree,
/// only one path is returned; use [`find_all_paths`] for exhaustive search.
pub fn find_one_path<M: TreeModel>(
  model: &M,
  roots: &[M::Node],
  id: &M::Key,
) -> Option<Vec<usize>> {
  for (i, node) in roots.iter().enumerate() {
    if model.key_of(node).as_ref() == Some(id) {
      return Some(vec![i]);
    }
    if let Some(children) = model.children(node) {
      if let Some(sub) = find_one_path(model, children, id) {
        let mut path = Vec::with_capacity(sub.len() + 1);
        path.push(i);
        path.extend(sub);
        return Some(path);
      }
    }
  }
  None
}

/// Exhaustive search: every node whose identity equals `id` yields one
/// root-first index path.
///
/// A match terminates descent at that branch (children of a matched node
/// are not searched) but the overall scan continues through remaining
/// siblings and subtrees.
pub fn find_all_paths<M: TreeModel>(model: &M, roots: &[M::Node], id: &M::Key) -> Vec<Vec<usize>> {
  let mut paths = Vec::new();
  let mut stack = Vec::new();
  collect_paths(model, roots, id, &mut stack, &mut paths);
  paths
}

fn collect_paths<M: TreeModel>(
  model: &M,
  level: &[M::Node],
  id: &M::Key,
  stack: &mut Vec<usize>,
  paths: &mut Vec<Vec<usize>>,
) {
  for (i, node) in level.iter().enumerate() {
    stack.push(i);
    if model.key_of(node).as_ref() == Some(id) {
      paths.push(stack.clone());
    } else if let Some(children) = model.children(node) {
      collect_paths(model, children, id, stack, paths);
    }
    stack.pop();
  }
}

/// Copy-on-trim pruning: clone the nodes along a fully-resolved path so that
/// each ancestor keeps only the next path element as its sole child.
///
/// Returns the cloned root of the pruned chain. The source tree is not
/// touched; sibling branches simply do not appear in the clone. Returns
/// `None` unless the whole path resolves.
pub fn trim_to_path<M: TreeModel>(model: &M, roots: &[M::Node], path: &[M::Key]) -> Option<M::Node> {
  if path.is_empty() {
    return None;
  }
  let indices = resolve_path(model, roots, path);
  if indices.len() != path.len() {
    return None;
  }
  let elems = elements_along(model, roots, &indices);
  let mut node = (*elems.last()?).clone();
  for ancestor in elems[..elems.len() - 1].iter().rev() {
    let mut parent = (*ancestor).clone();
    model.set_children(&mut parent, vec![node]);
    node = parent;
  }
  Some(node)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tree::JsonTreeModel;
  use serde_json::{json, Value};

  fn model() -> JsonTreeModel {
    JsonTreeModel::new("id", "children")
  }

  fn sample_tree() -> Vec<Value> {
    vec![json!({
      "id": 1,
      "children": [
        {"id": 2, "children": [{"id": 3}]}
      ]
    })]
  }

  #[test]
  fn test_resolve_full_path() {
    let tree = sample_tree();
    let indices = resolve_path(&model(), &tree, &[json!(1), json!(2), json!(3)]);
    assert_eq!(indices, vec![0, 0, 0]);
    let node = node_at(&model(), &tree, &indices).unwrap();
    assert_eq!(node["id"], json!(3));
  }

  #[test]
  fn test_resolve_partial_path_truncates_silently() {
    let tree = sample_tree();
    let indices = resolve_path(&model(), &tree, &[json!(1), json!(2), json!(99)]);
    assert_eq!(indices.len(), 2);
    let elems = elements_along(&model(), &tree, &indices);
    assert_eq!(elems[0]["id"], json!(1));
    assert_eq!(elems[1]["id"], json!(2));
  }

  #[test]
  fn test_resolve_missing_root_is_empty() {
    let tree = sample_tree();
    assert!(resolve_path(&model(), &tree, &[json!(42)]).is_empty());
    assert!(resolve_path(&model(), &[], &[json!(1)]).is_empty());
  }

  #[test]
  fn test_find_one_path_root_first() {
    let tree = sample_tree();
    let path = find_one_path(&model(), &tree, &json!(3)).unwrap();
    assert_eq!(path, vec![0, 0, 0]);
    let elems = elements_along(&model(), &tree, &path);
    let ids: Vec<_> = elems.iter().map(|e| e["id"].clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(2), json!(3)]);
  }

  #[test]
  fn test_find_one_path_checks_self_before_children() {
    // id 2 appears both as a root and inside the first root's children;
    // sibling order puts the descendant first.
    let m = model();
    let tree = vec![
      json!({"id": 1, "children": [{"id": 2, "tag": "nested"}]}),
      json!({"id": 2, "tag": "root"}),
    ];
    let path = find_one_path(&m, &tree, &json!(2)).unwrap();
    assert_eq!(path, vec![0, 0]);
  }

  #[test]
  fn test_find_all_paths_exhaustive_no_descent_below_match() {
    let m = model();
    let tree = vec![json!({
      "id": 1,
      "children": [
        {"id": 2},
        {"id": 3, "children": [{"id": 2, "children": [{"id": 2}]}]}
      ]
    })];
    let paths = find_all_paths(&m, &tree, &json!(2));
    assert_eq!(paths.len(), 2);
    // Root-first: [1, 2] and [1, 3, 2]. The id-2 node nested below a
    // matched id-2 node is not reported.
    let ids_of = |p: &Vec<usize>| {
      elements_along(&m, &tree, p)
        .iter()
        .map(|e| e["id"].clone())
        .collect::<Vec<_>>()
    };
    assert_eq!(ids_of(&paths[0]), vec![json!(1), json!(2)]);
    assert_eq!(ids_of(&paths[1]), vec![json!(1), json!(3), json!(2)]);
  }

  #[test]
  fn test_find_all_paths_no_match() {
    let tree = sample_tree();
    assert!(find_all_paths(&model(), &tree, &json!(99)).is_empty());
  }

  #[test]
  fn test_trim_to_path_prunes_siblings_without_touching_source() {
    let m = model();
    let tree = vec![json!({
      "id": 1,
      "children": [
        {"id": 2, "children": [{"id": 4}]},
        {"id": 3}
      ]
    })];
    let trimmed = trim_to_path(&m, &tree, &[json!(1), json!(2), json!(4)]).unwrap();
    assert_eq!(
      trimmed,
      json!({"id": 1, "children": [{"id": 2, "children": [{"id": 4}]}]})
    );
    // Source keeps its sibling branch.
    assert_eq!(m.children(&tree[0]).unwrap().len(), 2);
  }

  #[test]
  fn test_trim_to_path_requires_full_resolution() {
    let tree = sample_tree();
    assert!(trim_to_path(&model(), &tree, &[json!(1), json!(99)]).is_none());
    assert!(trim_to_path(&model(), &tree, &[]).is_none());
  }

  #[test]
  fn test_trim_to_path_single_segment() {
    let tree = sample_tree();
    let trimmed = trim_to_path(&model(), &tree, &[json!(1)]).unwrap();
    assert_eq!(trimmed, tree[0]);
  }
}
