//! # Offset index
//!
//! An ordered, in-memory `key -> (offset, length)` map, maintained coherently
//! with the segment log that backs it. Concurrency is single-threaded
//! exclusive per spec's concurrency model (§5); this crate adds no locking of
//! its own and expects the owning engine to serialize access.
//!
//! Backed by `BTreeMap`, the same ordered-map primitive the teacher's
//! `sstable::SSTableReader` uses for its in-memory key index.

use std::collections::BTreeMap;

use store_error::Result;

/// A byte range `[offset, offset+length)` within a segment file.
///
/// Immutable once produced — compaction always produces a brand-new
/// `FileLocation`, it never mutates one in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileLocation {
    pub offset: u64,
    pub length: u32,
}

impl FileLocation {
    #[must_use]
    pub fn new(offset: u64, length: u32) -> Self {
        Self { offset, length }
    }
}

/// Ordered `K -> FileLocation` index with O(log n) operations.
#[derive(Debug, Default)]
pub struct OffsetIndex<K> {
    map: BTreeMap<K, FileLocation>,
}

impl<K: Ord> OffsetIndex<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, key: K, location: FileLocation) -> Result<()> {
        self.map.insert(key, location);
        Ok(())
    }

    #[must_use]
    pub fn try_get(&self, key: &K) -> Option<FileLocation> {
        self.map.get(key).copied()
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<FileLocation> {
        self.map.remove(key)
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Keys and locations in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &FileLocation)> {
        self.map.iter()
    }
}
