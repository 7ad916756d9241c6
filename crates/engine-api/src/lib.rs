//! # Engine trait
//!
//! The common surface implemented by every concrete engine
//! (`segment-store`, `indexed-engine`, `segmented-engine`) so that the
//! Bloom-wrapped decorator (`bloom-engine`) can wrap any of them uniformly.
//!
//! The teacher crate never needed this seam — it has exactly one concrete
//! `Engine` struct, so nothing wraps it polymorphically. The decorator
//! requirement (spec's Bloom-over-engine layering) needs one; this crate
//! supplies it as a plain generic trait rather than a trait object, so every
//! composition (`BloomEngine<SegmentStore<...>>`, `BloomEngine<IndexedEngine
//! <...>>`, `BloomEngine<SegmentedEngine<...>>`) is resolved and inlined at
//! compile time — static dispatch, per the design notes.

use store_error::Result;

/// A key/value engine over ordered keys `K` and opaque values `V`.
///
/// All methods follow the failure semantics: I/O faults surface as
/// `StoreError::Io`, capacity faults as `StoreError::Capacity`, decode
/// failures as `StoreError::Corrupt`, and operations the engine does not
/// implement as `StoreError::Unsupported`.
pub trait Engine<K, V> {
    /// Inserts or updates `key` with `value`.
    fn set(&mut self, key: K, value: V) -> Result<()>;

    /// Looks up `key`, returning its current value if present.
    fn try_get(&self, key: &K) -> Result<Option<V>>;

    /// `true` if `key` is present.
    fn contains(&self, key: &K) -> Result<bool>;

    /// Removes `key`. Engines in this core have no tombstone mechanism, so
    /// every implementor returns `StoreError::Unsupported`.
    fn remove(&mut self, key: &K) -> Result<()>;

    /// Discards all data, returning the engine to its initial empty state.
    fn clear(&mut self) -> Result<()>;

    /// Bulk-loads `items`. See each implementor's docs for the exact
    /// replace-vs-append semantics (spec's open question on `set_bulk`).
    fn set_bulk(&mut self, items: Vec<(K, V)>) -> Result<()>;

    /// Returns every live `(key, value)` pair. Ordering is implementor
    /// specific (see each engine's docs); no engine does compression, so this
    /// is "iterate all", not a range scan.
    fn get_all(&self) -> Result<Vec<(K, V)>>;

    /// Reclaims space by keeping only the latest value per key.
    fn compact(&mut self) -> Result<()>;
}
