//! Tree-shaped collections: path resolution, search, and mutation.
//!
//! A tree is an ordered `Vec` of root records whose nodes may nest child
//! records. Node access goes through a [`TreeModel`] strategy, so the same
//! algorithms serve typed nodes and dynamic JSON nodes with configurable
//! field names.
//!
//! Resolution returns *index paths* (`Vec<usize>` of child positions,
//! root-first) rather than references into the tree. Mutation re-descends
//! through the root `Vec` by index, which makes "mutating via the path
//! writes through to the root" hold by construction instead of by aliasing.

mod model;
mod mutate;
mod resolve;

pub use model::{JsonTreeModel, TreeModel};
pub use mutate::{add_node, delete_node, edit_node};
pub use resolve::{
  elements_along, find_all_paths, find_one_path, node_at, node_at_mut, resolve_path, trim_to_path,
};
