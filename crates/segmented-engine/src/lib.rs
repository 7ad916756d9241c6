//! # Segmented engine
//!
//! Rolls a sequence of `indexed-engine` segment files, newest at the tail:
//! writes always land on the newest (active) segment, a read checks
//! newest-to-oldest so a later write always shadows an earlier one, and once
//! the active segment passes `max_segment_size` a fresh one is opened behind
//! it.
//!
//! Grounded on the teacher's `engine` crate, which manages an ordered run of
//! SSTables plus an active memtable the same way — rollover on a size
//! threshold, newest-first read path, full compaction collapsing every
//! segment into one. This engine has no separate memtable of its own (that
//! lives one layer up, composed by the caller); it only manages the on-disk
//! segment chain.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use codec::FieldCodec;
use engine_api::Engine;
use indexed_engine::IndexedEngine;
use store_error::{Result, StoreError};

const SEGMENT_PREFIX: &str = "segment-";
const SEGMENT_SUFFIX: &str = ".db";
const SEGMENT_ID_WIDTH: usize = 20;

pub struct SegmentedEngine<K, V> {
    dir: PathBuf,
    segments: Vec<IndexedEngine<K, V>>,
    max_segment_size: u64,
    next_segment_id: u64,
}

impl<K, V> SegmentedEngine<K, V>
where
    K: FieldCodec + Ord + Clone + std::hash::Hash,
    V: FieldCodec + Clone,
{
    /// Opens (creating if needed) the segment chain rooted at `dir`, rolling
    /// over to a new segment once the active one reaches
    /// `max_segment_size` bytes.
    pub fn open(dir: impl Into<PathBuf>, max_segment_size: u64) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(|e| StoreError::io(&dir, e))? {
            let entry = entry.map_err(|e| StoreError::io(&dir, e))?;
            if let Some(id) = parse_segment_id(&entry.file_name()) {
                ids.push(id);
            }
        }
        ids.sort_unstable();

        let mut segments = Vec::with_capacity(ids.len());
        for id in &ids {
            segments.push(IndexedEngine::open(segment_path(&dir, *id))?);
        }
        let next_segment_id = ids.last().map_or(0, |id| id + 1);

        let mut engine = Self {
            dir,
            segments,
            max_segment_size: max_segment_size.max(1),
            next_segment_id,
        };
        if engine.segments.is_empty() {
            engine.push_new_segment()?;
        }
        Ok(engine)
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn push_new_segment(&mut self) -> Result<()> {
        let id = self.next_segment_id;
        self.next_segment_id += 1;
        let segment = IndexedEngine::open(segment_path(&self.dir, id))?;
        self.segments.push(segment);
        Ok(())
    }

    fn active_segment_mut(&mut self) -> &mut IndexedEngine<K, V> {
        self.segments
            .last_mut()
            .expect("segment chain always has at least one segment")
    }

    fn maybe_rollover(&mut self) -> Result<()> {
        let active_path = self
            .segments
            .last()
            .expect("segment chain always has at least one segment")
            .path()
            .to_path_buf();
        let size = std::fs::metadata(&active_path)
            .map_err(|e| StoreError::io(&active_path, e))?
            .len();
        if size >= self.max_segment_size {
            self.push_new_segment()?;
        }
        Ok(())
    }
}

impl<K, V> Engine<K, V> for SegmentedEngine<K, V>
where
    K: FieldCodec + Ord + Clone + std::hash::Hash,
    V: FieldCodec + Clone,
{
    fn set(&mut self, key: K, value: V) -> Result<()> {
        self.maybe_rollover()?;
        self.active_segment_mut().set(key, value)
    }

    /// Checks segments newest-first so a later write always shadows an
    /// earlier one written to a different segment.
    fn try_get(&self, key: &K) -> Result<Option<V>> {
        for segment in self.segments.iter().rev() {
            if let Some(value) = segment.try_get(key)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn contains(&self, key: &K) -> Result<bool> {
        Ok(self.try_get(key)?.is_some())
    }

    fn remove(&mut self, _key: &K) -> Result<()> {
        Err(StoreError::Unsupported(
            "remove is not supported on the segmented engine",
        ))
    }

    fn clear(&mut self) -> Result<()> {
        for segment in &self.segments {
            std::fs::remove_file(segment.path()).ok();
        }
        self.segments.clear();
        self.next_segment_id = 0;
        self.push_new_segment()
    }

    /// Clears every segment, then replays `items` through `set` one at a
    /// time so rollover still applies to the freshly written data.
    fn set_bulk(&mut self, items: Vec<(K, V)>) -> Result<()> {
        self.clear()?;
        for (key, value) in segment_store::keep_latest_preserving_order(items) {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Merges every segment oldest-to-newest and keeps the latest value per
    /// key, so a key overwritten in a newer segment shadows its value in an
    /// older one.
    fn get_all(&self) -> Result<Vec<(K, V)>> {
        let mut merged = Vec::new();
        for segment in &self.segments {
            merged.extend(segment.get_all()?);
        }
        Ok(segment_store::keep_latest_preserving_order(merged))
    }

    /// Collapses the whole segment chain into a single fresh segment holding
    /// only the latest value per key, built in a temp file and swapped in
    /// via rename so a crash mid-compaction leaves the old chain intact.
    fn compact(&mut self) -> Result<()> {
        let merged = self.get_all()?;
        let old_paths: Vec<PathBuf> = self
            .segments
            .iter()
            .map(|s| s.path().to_path_buf())
            .collect();

        let tmp_path = self.dir.join("segment-compact.tmp");
        {
            let mut tmp_segment = IndexedEngine::open(&tmp_path)?;
            tmp_segment.set_bulk(merged)?;
        }

        let final_path = segment_path(&self.dir, 0);
        std::fs::rename(&tmp_path, &final_path).map_err(|e| StoreError::io(&final_path, e))?;
        for old in &old_paths {
            if old != &final_path {
                std::fs::remove_file(old).ok();
            }
        }

        self.segments = vec![IndexedEngine::open(&final_path)?];
        self.next_segment_id = 1;
        Ok(())
    }
}

fn segment_path(dir: &Path, id: u64) -> PathBuf {
    dir.join(format!(
        "{SEGMENT_PREFIX}{id:0width$}{SEGMENT_SUFFIX}",
        width = SEGMENT_ID_WIDTH
    ))
}

fn parse_segment_id(name: &OsStr) -> Option<u64> {
    let name = name.to_str()?;
    let name = name.strip_prefix(SEGMENT_PREFIX)?;
    let name = name.strip_suffix(SEGMENT_SUFFIX)?;
    name.parse::<u64>().ok()
}

#[cfg(test)]
mod tests;
