//! Small shared lookups used by more than one entity handler.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Find a value whose key equals `id` exactly, or — if `id` is short — the
/// unique entry whose key starts with it (mirroring the way git lets you
/// address a commit by a unique prefix of its hash).
pub(crate) fn find_by_prefix<'a, K, V>(map: &'a HashMap<K, V>, id: &str) -> Option<&'a V>
where
    K: Borrow<str> + Eq + Hash,
{
    if let Some(v) = map.get(id) {
        return Some(v);
    }
    let mut matches = map.iter().filter(|(k, _)| k.borrow().starts_with(id));
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first.1)
}
