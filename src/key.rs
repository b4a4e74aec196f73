//! Short-key construction for cached collections.
//!
//! A collection is addressed by its endpoint plus the query that produced
//! it, so the same endpoint fetched with different filters caches under
//! different keys. Query parameters serialize in sorted order to keep the
//! key independent of map iteration order.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Serialize a query map as sorted `k=v&` pairs.
///
/// Entries whose value is `null` or an empty string are skipped, matching
/// how optional filters are typically left unset. Returns `None` when
/// nothing survives, so callers can key the unfiltered collection plainly.
pub fn serialize_query(query: &Map<String, Value>) -> Option<String> {
  let mut keys: Vec<&String> = query.keys().collect();
  keys.sort();

  let mut pairs = Vec::with_capacity(keys.len());
  for key in keys {
    let value = &query[key.as_str()];
    let rendered = match value {
      Value::Null => continue,
      Value::String(s) if s.is_empty() => continue,
      Value::String(s) => s.clone(),
      other => other.to_string(),
    };
    pairs.push(format!("{key}={rendered}"));
  }

  if pairs.is_empty() {
    None
  } else {
    Some(pairs.join("&"))
  }
}

/// Short key for a collection: the bare endpoint, or `endpoint/{query}`
/// when a non-empty query participated in the fetch.
pub fn collection_key(endpoint: &str, query: Option<&Map<String, Value>>) -> String {
  match query.and_then(serialize_query) {
    Some(q) => format!("{endpoint}/{q}"),
    None => endpoint.to_string(),
  }
}

/// Fixed-width digest of a short key, for backends that cap key length.
pub fn hashed_key(short_key: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(short_key.as_bytes());
  hex::encode(hasher.finalize())
}
