//! Persisted caches: read-modify-write over serialized collections.
//!
//! Each operation deserializes the named collection from storage, applies
//! the in-memory mutation from [`crate::list`] / [`crate::tree`], and
//! writes the full serialized blob back. No in-memory copy is retained
//! between calls: every read deserializes freshly, and the serialized
//! payload is the sole durable representation.
//!
//! There is no versioning on the blob: callers are expected to be the
//! single logical writer per short key at a time. Concurrent writers race
//! and the last write wins.

mod list;
mod tree;

pub use list::ListCache;
pub use tree::TreeCache;
