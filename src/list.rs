//! Identity comparator and flat collection mutator.
//!
//! Pure, in-memory operations over ordered collections. Identity access is a
//! strategy: every function takes a `key_of` closure extracting the identity
//! value, so the same code serves typed records (`Keyed::key`) and dynamic
//! JSON records (a closure over a configured field name).
//!
//! None of these functions touch storage; the persisted wrappers live in
//! [`crate::cache`].

/// Membership test with a caller-supplied equality comparator.
pub fn contains<T, F>(list: &[T], record: &T, eq: F) -> bool
where
  F: Fn(&T, &T) -> bool,
{
  list.iter().any(|e| eq(e, record))
}

/// Find the first record whose identity equals `id`, in index order.
pub fn find_one<'a, T, K, F>(list: &'a [T], id: &K, key_of: F) -> Option<&'a T>
where
  K: PartialEq,
  F: Fn(&T) -> Option<K>,
{
  list.iter().find(|e| key_of(e).as_ref() == Some(id))
}

/// Index of the first record whose identity equals `id`.
pub fn position_of<T, K, F>(list: &[T], id: &K, key_of: F) -> Option<usize>
where
  K: PartialEq,
  F: Fn(&T) -> Option<K>,
{
  list.iter().position(|e| key_of(e).as_ref() == Some(id))
}

/// Find every record matching any of `ids`, preserving source order.
///
/// Returns `None` when nothing matched, never an empty vec, so "found
/// nothing" and "found empty" are the same case for callers.
pub fn find_many<'a, T, K, F>(list: &'a [T], ids: &[K], key_of: F) -> Option<Vec<&'a T>>
where
  K: PartialEq,
  F: Fn(&T) -> Option<K>,
{
  if ids.is_empty() {
    return None;
  }
  let found: Vec<&T> = list
    .iter()
    .filter(|e| match key_of(e) {
      Some(k) => ids.contains(&k),
      None => false,
    })
    .collect();
  if found.is_empty() {
    None
  } else {
    Some(found)
  }
}

/// Prepend a record (newest-first display ordering).
pub fn add_one<T>(list: &mut Vec<T>, record: T) {
  list.insert(0, record);
}

/// Replace the first record whose identity equals `record`'s identity.
///
/// Returns `false` without mutation when the record carries no identity or
/// nothing matched.
pub fn edit_one<T, K, F>(list: &mut [T], record: &T, key_of: F) -> bool
where
  T: Clone,
  K: PartialEq,
  F: Fn(&T) -> Option<K>,
{
  let id = match key_of(record) {
    Some(id) => id,
    None => return false,
  };
  match list.iter().position(|e| key_of(e).as_ref() == Some(&id)) {
    Some(i) => {
      list[i] = record.clone();
      true
    }
    None => false,
  }
}

/// Replace *every* matching record, for each input record.
///
/// Unlike [`edit_one`], a single input replaces all of its matches, not just
/// the first. Returns `true` when at least one replacement occurred across
/// the whole batch.
pub fn edit_many<T, K, F>(list: &mut [T], records: &[T], key_of: F) -> bool
where
  T: Clone,
  K: PartialEq,
  F: Fn(&T) -> Option<K>,
{
  let mut changed = false;
  for record in records {
    let id = match key_of(record) {
      Some(id) => id,
      None => continue,
    };
    for e in list.iter_mut() {
      if key_of(e).as_ref() == Some(&id) {
        *e = record.clone();
        changed = true;
      }
    }
  }
  changed
}

/// Remove the first record whose identity equals `id`.
pub fn delete_one_by_id<T, K, F>(list: &mut Vec<T>, id: &K, key_of: F) -> bool
where
  K: PartialEq,
  F: Fn(&T) -> Option<K>,
{
  match list.iter().position(|e| key_of(e).as_ref() == Some(id)) {
    Some(i) => {
      list.remove(i);
      true
    }
    None => false,
  }
}

/// Remove every record matching any of `ids`.
///
/// Reports `true` when the collection was non-empty on entry, even if zero
/// records actually matched. This existence-based success is deliberate and
/// documented; callers wanting removal counts must diff lengths themselves.
pub fn delete_many_by_ids<T, K, F>(list: &mut Vec<T>, ids: &[K], key_of: F) -> bool
where
  K: PartialEq,
  F: Fn(&T) -> Option<K>,
{
  if list.is_empty() || ids.is_empty() {
    return false;
  }
  list.retain(|e| match key_of(e) {
    Some(k) => !ids.contains(&k),
    None => true,
  });
  true
}

/// Derive the identity from `record` and delegate to [`delete_one_by_id`].
pub fn delete_one<T, K, F>(list: &mut Vec<T>, record: &T, key_of: F) -> bool
where
  K: PartialEq,
  F: Fn(&T) -> Option<K>,
{
  match key_of(record) {
    Some(id) => delete_one_by_id(list, &id, key_of),
    None => false,
  }
}

/// Derive identities from `records` (skipping records without one) and
/// delegate to [`delete_many_by_ids`].
pub fn delete_many<T, K, F>(list: &mut Vec<T>, records: &[T], key_of: F) -> bool
where
  K: PartialEq,
  F: Fn(&T) -> Option<K>,
{
  let ids: Vec<K> = records.iter().filter_map(&key_of).collect();
  if ids.is_empty() {
    return false;
  }
  delete_many_by_ids(list, &ids, key_of)
}
