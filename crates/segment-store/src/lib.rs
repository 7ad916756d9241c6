//! # Segment store
//!
//! The simplest on-disk engine: a single append-only file of length-prefixed
//! records, read back with a full linear scan. No index, no Bloom filter —
//! every other on-disk engine in this workspace either wraps this one or
//! borrows its compaction utility ([`keep_latest_preserving_order`]).
//!
//! Grounded on the teacher's `wal` crate (the append + sequential-replay
//! loop) and `sstable::merge` (the keep-latest-wins compaction rule), merged
//! into a single engine since this core has no separate write-ahead log.

mod compaction;

use std::hash::Hash;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use codec::{BinaryEntryCodec, KvCodec};
use engine_api::Engine;
use storage_file::{FileExistence, OpenMode, StorageFile};
use store_error::{Result, StoreError};

pub use compaction::keep_latest_preserving_order;

/// An append-only, unindexed `(K, V)` log on disk.
///
/// Every write is a single `append`; every read is a full sequential scan
/// that keeps the last-written value for a key (last-wins, mirroring a log's
/// natural semantics). There is no tombstone, so [`remove`](Engine::remove)
/// is unsupported — callers that need deletion build it on top (see
/// `indexed-engine` and `segmented-engine`).
pub struct SegmentStore<K, V> {
    file: StorageFile,
    codec: BinaryEntryCodec<K, V>,
}

impl<K, V> SegmentStore<K, V>
where
    K: codec::FieldCodec + Clone + Eq + Hash,
    V: codec::FieldCodec + Clone,
{
    /// Opens the segment at `path`, creating an empty file if one does not
    /// already exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let file = StorageFile::new(path)?;
        file.create(FileExistence::DoNothingIfExists)?;
        Ok(Self {
            file,
            codec: BinaryEntryCodec::new(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Every record in append order, without deduplication.
    pub fn scan_all(&self) -> Result<Vec<(K, V)>> {
        let mut handle = self.file.open(OpenMode::Read)?;
        handle.seek(SeekFrom::Start(0))?;
        let mut out = Vec::new();
        while let Some(entry) = self.codec.read_entry(&mut handle)? {
            out.push(entry);
        }
        Ok(out)
    }

    fn append_entry(&self, key: &K, value: &V) -> Result<()> {
        let mut handle = self.file.open(OpenMode::Append)?;
        self.codec.write_entry(&mut handle, key, value)?;
        handle.close()
    }

    /// Atomically rewrites the segment from `items` via a temp file + rename,
    /// so a crash mid-write leaves the original file untouched.
    fn rewrite_atomically(&self, items: &[(K, V)]) -> Result<()> {
        let tmp_path = tmp_path_for(self.file.path());
        let tmp = StorageFile::new(&tmp_path)?;
        tmp.create(FileExistence::Overwrite)?;
        {
            let mut handle = tmp.open(OpenMode::Write)?;
            for (key, value) in items {
                self.codec.write_entry(&mut handle, key, value)?;
            }
            handle.close()?;
        }
        std::fs::rename(&tmp_path, self.file.path())
            .map_err(|e| StoreError::io(self.file.path(), e))
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

impl<K, V> Engine<K, V> for SegmentStore<K, V>
where
    K: codec::FieldCodec + Clone + Eq + Hash,
    V: codec::FieldCodec + Clone,
{
    fn set(&mut self, key: K, value: V) -> Result<()> {
        self.append_entry(&key, &value)
    }

    fn try_get(&self, key: &K) -> Result<Option<V>> {
        let all = self.scan_all()?;
        Ok(all
            .into_iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v))
    }

    fn contains(&self, key: &K) -> Result<bool> {
        Ok(self.try_get(key)?.is_some())
    }

    fn remove(&mut self, _key: &K) -> Result<()> {
        Err(StoreError::Unsupported(
            "remove is not supported on the append-only segment store",
        ))
    }

    fn clear(&mut self) -> Result<()> {
        self.file.create(FileExistence::Overwrite)
    }

    /// Raw replace: the segment is fully overwritten with `items` in the
    /// order given, with no deduplication. This is distinct from
    /// `indexed-engine`'s `set_bulk`, which clears and re-appends through its
    /// own `set` so the offset index stays consistent (Open Question #2).
    fn set_bulk(&mut self, items: Vec<(K, V)>) -> Result<()> {
        self.rewrite_atomically(&items)
    }

    /// Every record ever written and not yet compacted away, in insertion
    /// order — including repeated keys. Unlike `try_get`, this does not
    /// collapse overwrites; that only happens on `compact`.
    fn get_all(&self) -> Result<Vec<(K, V)>> {
        self.scan_all()
    }

    /// Rewrites the segment keeping only the latest occurrence of each key,
    /// in the order of that latest occurrence, via temp file + rename.
    fn compact(&mut self) -> Result<()> {
        let deduped = keep_latest_preserving_order(self.scan_all()?);
        self.rewrite_atomically(&deduped)
    }
}

#[cfg(test)]
mod tests;
