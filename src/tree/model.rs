//! Node access strategies for tree operations.

use serde_json::Value;
use std::fmt::Debug;

use crate::config::CacheConfig;

/// Strategy for reading and writing tree nodes.
///
/// Implementors decide how a node exposes its identity value and its child
/// list. Tree algorithms are generic over this trait, so identity and
/// children stay configurable without stringly-typed field lookups on the
/// algorithm side.
pub trait TreeModel {
  type Node: Clone;
  type Key: Clone + PartialEq + Debug;

  /// The node's identity value, if it has one.
  fn key_of(&self, node: &Self::Node) -> Option<Self::Key>;

  /// The node's children, if the children field is present.
  fn children<'a>(&self, node: &'a Self::Node) -> Option<&'a [Self::Node]>;

  /// Mutable access to the node's children, if present.
  fn children_mut<'a>(&self, node: &'a mut Self::Node) -> Option<&'a mut Vec<Self::Node>>;

  /// Replace the node's children, creating the field if absent.
  fn set_children(&self, node: &mut Self::Node, children: Vec<Self::Node>);
}

/// [`TreeModel`] over dynamic JSON objects with configurable field names.
///
/// Identity values are compared as raw `serde_json::Value`s, so string and
/// numeric ids both work. A `null` or absent identity field counts as "no
/// identity".
#[derive(Debug, Clone)]
pub struct JsonTreeModel {
  id_field: String,
  children_field: String,
}

impl JsonTreeModel {
  pub fn new(id_field: impl Into<String>, children_field: impl Into<String>) -> Self {
    Self {
      id_field: id_field.into(),
      children_field: children_field.into(),
    }
  }

  /// Model using the configured `id_field` / `children_field`.
  pub fn from_config(config: &CacheConfig) -> Self {
    Self::new(config.id_field.clone(), config.children_field.clone())
  }

  /// The identity accessor as a standalone closure, for the flat-list
  /// operations in [`crate::list`] and the persisted list cache.
  pub fn key_fn(&self) -> impl Fn(&Value) -> Option<Value> + '_ {
    move |v: &Value| v.get(&self.id_field).filter(|k| !k.is_null()).cloned()
  }
}

impl Default for JsonTreeModel {
  fn default() -> Self {
    Self::new("_id", "children")
  }
}

impl TreeModel for JsonTreeModel {
  type Node = Value;
  type Key = Value;

  fn key_of(&self, node: &Value) -> Option<Value> {
    node.get(&self.id_field).filter(|k| !k.is_null()).cloned()
  }

  fn children<'a>(&self, node: &'a Value) -> Option<&'a [Value]> {
    node
      .get(&self.children_field)
      .and_then(|v| v.as_array())
      .map(|v| v.as_slice())
  }

  fn children_mut<'a>(&self, node: &'a mut Value) -> Option<&'a mut Vec<Value>> {
    node
      .get_mut(&self.children_field)
      .and_then(|v| v.as_array_mut())
  }

  fn set_children(&self, node: &mut Value, children: Vec<Value>) {
    if let Some(obj) = node.as_object_mut() {
      obj.insert(self.children_field.clone(), Value::Array(children));
    }
  }
}
