//! # MemTable
//!
//! The mutable, in-memory write buffer sitting in front of an on-disk engine.
//! Backed by a left-leaning red-black tree ([`tree`]) so lookups, inserts,
//! and the ordered `get_all` scan are all `O(log n)` / `O(n)` without needing
//! a separate sort step, the way a plain hash map would.
//!
//! The MemTable never deletes: `remove` is [`StoreError::Unsupported`], since
//! nothing above it ever asks a write buffer to forget a key out of order —
//! eviction happens by flushing the whole table to the backing engine and
//! calling [`RbMemTable::clear`].

mod tree;

use store_error::{Result, StoreError};
use tree::Link;

/// An in-memory, capacity-bounded, ordered key/value buffer.
///
/// `max_size` bounds the number of distinct keys the table will accept.
/// Updating a key already present is always allowed, even once the table is
/// full — growth only happens when a brand-new key would push `len` past
/// `max_size`.
pub struct RbMemTable<K, V> {
    root: Link<K, V>,
    len: usize,
    max_size: usize,
}

impl<K: Ord, V> RbMemTable<K, V> {
    /// Creates an empty MemTable accepting at most `max_size` distinct keys.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            root: None,
            len: 0,
            max_size: max_size.max(1),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len >= self.max_size
    }

    /// Inserts or updates `key`. Rejects a brand-new key with
    /// [`StoreError::Capacity`] once the table is full; updates to an
    /// existing key always succeed.
    pub fn set(&mut self, key: K, value: V) -> Result<()> {
        if self.is_full() && !tree::contains(&self.root, &key) {
            return Err(StoreError::Capacity);
        }
        let (mut root, is_new) = tree::insert(self.root.take(), key, value);
        tree::blacken_root(&mut root);
        self.root = Some(root);
        if is_new {
            self.len += 1;
        }
        Ok(())
    }

    #[must_use]
    pub fn try_get(&self, key: &K) -> Option<&V> {
        tree::get(&self.root, key)
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        tree::contains(&self.root, key)
    }

    /// Always fails: the MemTable is an append/overwrite-only buffer, it has
    /// no tombstone mechanism.
    pub fn remove(&self, _key: &K) -> Result<()> {
        Err(StoreError::Unsupported(
            "remove is not supported on the MemTable; flush and clear instead",
        ))
    }

    /// Drops every entry, resetting the table to empty.
    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Returns every entry in ascending key order.
    #[must_use]
    pub fn get_all(&self) -> Vec<(&K, &V)> {
        let mut out = Vec::with_capacity(self.len);
        tree::in_order(&self.root, &mut out);
        out
    }
}

#[cfg(test)]
mod tests;
