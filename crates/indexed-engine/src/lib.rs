//! # Indexed engine
//!
//! A [`segment-store`](../segment_store/index.html)-style append log paired
//! with an in-memory [`offset-index`](../offset_index/index.html), turning
//! point lookups from an `O(n)` scan into an `O(log n)` index probe followed
//! by one exact-range file read.
//!
//! Grounded on the teacher's `sstable::SSTableReader`, which keeps exactly
//! this pairing (in-memory `BTreeMap` index over an immutable on-disk file).
//! Unlike an SSTable, this engine's file is mutable: `set` appends and
//! updates the index in place, so there is no separate flush/merge step to
//! bring a segment into existence.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use codec::{BinaryEntryCodec, FieldCodec, KvCodec};
use engine_api::Engine;
use offset_index::{FileLocation, OffsetIndex};
use storage_file::{FileExistence, OpenMode, StorageFile};
use store_error::{Result, StoreError};

pub struct IndexedEngine<K, V> {
    file: StorageFile,
    codec: BinaryEntryCodec<K, V>,
    index: OffsetIndex<K>,
}

impl<K, V> IndexedEngine<K, V>
where
    K: FieldCodec + Ord + Clone + std::hash::Hash,
    V: FieldCodec + Clone,
{
    /// Opens the engine at `path`. The offset index is always rebuilt from a
    /// full forward scan of the file rather than trusted from a prior run —
    /// this engine keeps no separate manifest of its index, so "always
    /// rebuild on open" is the one recovery strategy that cannot drift from
    /// the data (Open Question: index persistence).
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let file = StorageFile::new(path)?;
        file.create(FileExistence::DoNothingIfExists)?;
        let codec = BinaryEntryCodec::new();
        let index = build_index(&file, &codec)?;
        Ok(Self { file, codec, index })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn read_at(&self, location: FileLocation) -> Result<Option<(K, V)>> {
        let bytes = self.file.read_bytes(location.offset, location.length)?;
        let mut cursor = Cursor::new(bytes);
        self.codec.read_entry(&mut cursor)
    }

    fn rewrite_and_reindex(&mut self, items: &[(K, V)]) -> Result<()> {
        let tmp_path = tmp_path_for(self.file.path());
        let tmp = StorageFile::new(&tmp_path)?;
        tmp.create(FileExistence::Overwrite)?;
        let mut new_index = OffsetIndex::new();
        {
            let mut handle = tmp.open(OpenMode::Write)?;
            for (key, value) in items {
                let offset = handle.position()?;
                self.codec.write_entry(&mut handle, key, value)?;
                let length = (handle.position()? - offset) as u32;
                new_index.set(key.clone(), FileLocation::new(offset, length))?;
            }
            handle.close()?;
        }
        std::fs::rename(&tmp_path, self.file.path())
            .map_err(|e| StoreError::io(self.file.path(), e))?;
        self.index = new_index;
        Ok(())
    }
}

fn build_index<K, V>(
    file: &StorageFile,
    codec: &BinaryEntryCodec<K, V>,
) -> Result<OffsetIndex<K>>
where
    K: FieldCodec + Ord + Clone,
    V: FieldCodec,
{
    let mut index = OffsetIndex::new();
    let mut handle = file.open(OpenMode::Read)?;
    loop {
        let offset = handle.position()?;
        match codec.read_entry(&mut handle)? {
            None => break,
            Some((key, _value)) => {
                let length = (handle.position()? - offset) as u32;
                index.set(key, FileLocation::new(offset, length))?;
            }
        }
    }
    Ok(index)
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

impl<K, V> Engine<K, V> for IndexedEngine<K, V>
where
    K: FieldCodec + Ord + Clone + std::hash::Hash,
    V: FieldCodec + Clone,
{
    fn set(&mut self, key: K, value: V) -> Result<()> {
        let mut buf = Vec::with_capacity(32);
        self.codec.write_entry(&mut buf, &key, &value)?;
        let offset = self.file.size()?;
        self.file.append_all(&buf)?;
        self.index
            .set(key, FileLocation::new(offset, buf.len() as u32))
    }

    fn try_get(&self, key: &K) -> Result<Option<V>> {
        match self.index.try_get(key) {
            None => Ok(None),
            Some(location) => Ok(self.read_at(location)?.map(|(_, v)| v)),
        }
    }

    fn contains(&self, key: &K) -> Result<bool> {
        Ok(self.index.contains(key))
    }

    /// The append-only backing file has no tombstone, so a removed key
    /// cannot be distinguished from one that was never written — the
    /// in-memory index drops its entry, but the stale record remains in the
    /// file until the next `compact`.
    fn remove(&mut self, _key: &K) -> Result<()> {
        Err(StoreError::Unsupported(
            "remove is not supported on the indexed engine",
        ))
    }

    fn clear(&mut self) -> Result<()> {
        self.file.create(FileExistence::Overwrite)?;
        self.index.clear();
        Ok(())
    }

    /// Deduplicates `items` by key (last one wins) and rewrites the file and
    /// index together in one pass — distinct from `segment-store::set_bulk`,
    /// which replaces the file's raw contents without deduplication or index
    /// bookkeeping.
    fn set_bulk(&mut self, items: Vec<(K, V)>) -> Result<()> {
        let deduped = segment_store::keep_latest_preserving_order(items);
        self.rewrite_and_reindex(&deduped)
    }

    /// Entries in ascending key order (the index's natural iteration order),
    /// not in order of last write — a different but equally valid contract
    /// from `segment-store::get_all`'s occurrence order, since here the
    /// index is already the deduplicated source of truth.
    fn get_all(&self) -> Result<Vec<(K, V)>> {
        let mut out = Vec::with_capacity(self.index.len());
        for (key, location) in self.index.iter() {
            if let Some((_, value)) = self.read_at(*location)? {
                out.push((key.clone(), value));
            }
        }
        Ok(out)
    }

    /// Rewrites the file to hold only the latest value per key (already true
    /// of the index, so this is just `get_all` written back through a fresh
    /// temp file + rename) and rebuilds the index against the new offsets.
    fn compact(&mut self) -> Result<()> {
        let items = self.get_all()?;
        self.rewrite_and_reindex(&items)
    }
}
