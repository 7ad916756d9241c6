//! Shared error taxonomy for the storage engine.
//!
//! Every core crate (codec, storage-file, segment-store, indexed-engine,
//! memtable, segmented-engine, ...) returns [`StoreError`] so that callers can
//! match on failure kind instead of parsing error strings. This generalizes
//! the pattern the teacher crate used locally in its `wal` crate
//! (`WalError`, a small `thiserror` enum with an `Io` variant and a `Corrupt`
//! variant) to the full taxonomy spec'd for this engine.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The result type returned by every core-crate operation.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error taxonomy shared across the engine. Errors surface to the caller
/// unchanged except for contextual decoration (path, offset) — nothing here
/// is silently retried.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Null/empty/default-valued key or value, negative offset/count, or an
    /// undefined enum value was passed in.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A filesystem error, decorated with the path that triggered it.
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The codec failed to decode a record starting at `offset` — a torn
    /// write, bad length prefix, or CRC mismatch.
    #[error("corrupt record at offset {offset}")]
    Corrupt { offset: u64 },

    /// The MemTable is full, or a segment is full and rollover is disabled.
    #[error("capacity exceeded")]
    Capacity,

    /// The operation is not implemented by this engine (e.g. `remove` on an
    /// append-only engine, which has no tombstone mechanism).
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Cooperative cancellation: signaled before any I/O byte was issued.
    #[error("operation cancelled")]
    Cancelled,
}

impl StoreError {
    /// Wraps an [`io::Error`] with the path that was being operated on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// `true` if this is a [`StoreError::Corrupt`] variant.
    #[must_use]
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt { .. })
    }
}
