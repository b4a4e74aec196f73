//! Identity access for typed records.

use std::fmt::Debug;

/// Trait for records with a canonical identity value.
///
/// Core operations take the identity accessor as a closure parameter, so
/// this trait is never required; it only supplies the default strategy for
/// typed records: pass `Keyed::key` wherever a `key_of` closure is expected.
///
/// `key` returns `Option` because records fresh from a form or a partial
/// API response may not carry an identity yet; mutators skip such records.
pub trait Keyed {
  /// Identity value type (e.g. `String`, `u64`, `serde_json::Value`).
  type Key: Clone + PartialEq + Debug;

  /// The record's identity value, if it has one.
  fn key(&self) -> Option<Self::Key>;
}
