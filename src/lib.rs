//! Client-side cache consistency for list- and tree-shaped collections.
//!
//! Applications that cache remote collections locally go stale the moment
//! the user mutates a record: the server accepted the change, but every
//! cached collection containing that record still shows the old state.
//! This crate keeps those cached collections consistent by replaying each
//! mutation against the stored payloads, so reads keep hitting cache
//! instead of refetching.
//!
//! The layers, bottom up:
//!
//! - [`list`] and [`tree`] mutate in-memory collections. Records are opaque
//!   to them; identity comes from caller-supplied key closures (or a
//!   [`record::Keyed`] impl), and tree shape from a [`tree::TreeModel`].
//! - [`storage`] is the persistence seam: a [`storage::KeyValueStorage`]
//!   backend trait with in-memory and SQLite implementations, composed
//!   into a session/local [`storage::ScopedStorage`] pair.
//! - [`cache`] ties them together: [`cache::ListCache`] and
//!   [`cache::TreeCache`] deserialize a stored collection, apply a
//!   mutation, and write it back.
//! - [`fetch`] is the cache-first read path, and [`key`] builds the short
//!   keys that address collections.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod key;
pub mod list;
pub mod record;
pub mod storage;
pub mod tree;

pub use cache::{ListCache, TreeCache};
pub use config::CacheConfig;
pub use error::{CacheError, StorageError};
pub use fetch::{FetchLayer, FetchSource, Fetched};
pub use record::Keyed;
pub use storage::{KeyValueStorage, ScopedStorage, StorageScope};
pub use tree::{JsonTreeModel, TreeModel};
