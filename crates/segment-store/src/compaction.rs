use std::collections::HashSet;
use std::hash::Hash;

/// Keeps only the last occurrence of each key in `items`, preserving the
/// relative order of those latest occurrences (not the order of first
/// appearance). Shared by every on-disk engine's `compact`/`get_all`, since
/// all of them carry the same last-write-wins semantics.
///
/// Walking the sequence backwards and recording the first time each key is
/// seen gives exactly the set of latest occurrences, already in the right
/// relative order once the result is reversed back to forward.
pub fn keep_latest_preserving_order<K, V>(items: Vec<(K, V)>) -> Vec<(K, V)>
where
    K: Eq + Hash + Clone,
{
    let mut seen = HashSet::with_capacity(items.len());
    let mut out = Vec::with_capacity(items.len());
    for (key, value) in items.into_iter().rev() {
        if seen.insert(key.clone()) {
            out.push((key, value));
        }
    }
    out.reverse();
    out
}
