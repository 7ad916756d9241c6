//! # Storage file
//!
//! A scoped handle over a single file with byte-level operations. Every
//! operation has a blocking, synchronous form; most also have an asynchronous
//! twin with cooperative cancellation (see [`CancellationToken`]).
//!
//! Resource acquisition is scoped: a [`FileHandle`] handed to a caller is
//! released on all exit paths (including panics, via `Drop`), and any
//! buffered writes are flushed before the underlying OS handle is closed.
//!
//! This generalizes the ad hoc `OpenOptions` calls scattered through the
//! teacher's `wal` and `sstable` crates (`OpenOptions::new().create(true)
//! .append(true)...`) into one reusable abstraction, and adds the async +
//! cancellation surface spec'd for this engine, grounded on the optional
//! `tokio` runtime the sibling example `ElioNeto-lsm-kv-store` wires up for
//! its own API layer.

mod cancel;
mod handle;

pub use cancel::CancellationToken;
pub use handle::FileHandle;

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use store_error::{Result, StoreError};

/// Policy for [`StorageFile::create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileExistence {
    /// Replace the file if it already exists.
    Overwrite,
    /// Leave an existing file untouched; create it if missing.
    DoNothingIfExists,
    /// Fail with [`StoreError::InvalidArgument`] if the file already exists.
    ThrowIfExists,
}

/// Policy for [`StorageFile::delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileDeletion {
    /// Delete the file; no error if it is already missing.
    DeleteIfExists,
    /// Alias of `DeleteIfExists` kept for call-site clarity.
    IgnoreIfMissing,
    /// Fail if the file does not exist.
    ThrowIfMissing,
}

/// Mode passed to [`StorageFile::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
    Append,
    ReadWrite,
}

fn open_options_for(mode: OpenMode) -> OpenOptions {
    let mut opts = OpenOptions::new();
    match mode {
        OpenMode::Read => {
            opts.read(true);
        }
        OpenMode::Write => {
            opts.write(true).create(true).truncate(true);
        }
        OpenMode::Append => {
            opts.append(true).create(true).read(true);
        }
        OpenMode::ReadWrite => {
            opts.read(true).write(true).create(true);
        }
    }
    opts
}

/// A scoped handle over a single file on disk.
///
/// `StorageFile` itself owns no OS resources — it is a cheap path wrapper.
/// Every operation opens, does its work, and (via [`FileHandle`]'s `Drop`)
/// closes the underlying descriptor.
#[derive(Debug, Clone)]
pub struct StorageFile {
    path: PathBuf,
}

impl StorageFile {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(StoreError::InvalidArgument(
                "file path must not be empty".to_string(),
            ));
        }
        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Creates the file according to `existence`.
    pub fn create(&self, existence: FileExistence) -> Result<()> {
        match existence {
            FileExistence::Overwrite => {
                File::create(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
            }
            FileExistence::DoNothingIfExists => {
                if !self.exists() {
                    File::create(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
                }
            }
            FileExistence::ThrowIfExists => {
                if self.exists() {
                    return Err(StoreError::InvalidArgument(format!(
                        "file already exists: {}",
                        self.path.display()
                    )));
                }
                File::create(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
            }
        }
        Ok(())
    }

    /// Opens the file in `mode`, returning an owned, scoped [`FileHandle`].
    pub fn open(&self, mode: OpenMode) -> Result<FileHandle> {
        let file = open_options_for(mode)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;
        Ok(FileHandle::new(self.path.clone(), file))
    }

    pub fn delete(&self, handling: FileDeletion) -> Result<()> {
        match handling {
            FileDeletion::ThrowIfMissing if !self.exists() => {
                return Err(StoreError::InvalidArgument(format!(
                    "file does not exist: {}",
                    self.path.display()
                )));
            }
            _ => {}
        }
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }

    pub fn size(&self) -> Result<u64> {
        fs::metadata(&self.path)
            .map(|m| m.len())
            .map_err(|e| StoreError::io(&self.path, e))
    }

    /// Reads exactly `count` bytes starting at `offset`.
    pub fn read_bytes(&self, offset: u64, count: u32) -> Result<Vec<u8>> {
        let mut handle = self.open(OpenMode::Read)?;
        handle.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; count as usize];
        handle.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_all(&self) -> Result<Vec<u8>> {
        let mut handle = self.open(OpenMode::Read)?;
        let mut buf = Vec::new();
        handle
            .file_mut()
            .read_to_end(&mut buf)
            .map_err(|e| StoreError::io(&self.path, e))?;
        Ok(buf)
    }

    pub fn read_all_text(&self) -> Result<String> {
        let bytes = self.read_all()?;
        String::from_utf8(bytes).map_err(|_| {
            StoreError::InvalidArgument(format!("{} is not valid UTF-8", self.path.display()))
        })
    }

    /// Replaces the file's entire contents with `data` in a single write.
    pub fn write_all(&self, data: &[u8]) -> Result<()> {
        let mut handle = self.open(OpenMode::Write)?;
        handle.write_all(data)?;
        handle.close()
    }

    pub fn write_all_text(&self, text: &str) -> Result<()> {
        self.write_all(text.as_bytes())
    }

    /// Appends `data` to the end of the file.
    pub fn append_all(&self, data: &[u8]) -> Result<()> {
        let mut handle = self.open(OpenMode::Append)?;
        handle.write_all(data)?;
        handle.close()
    }

    // ---- async twins ----

    pub async fn create_async(
        &self,
        existence: FileExistence,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        let this = self.clone();
        run_blocking(move || this.create(existence)).await
    }

    pub async fn open_async(&self, mode: OpenMode, cancel: &CancellationToken) -> Result<FileHandle> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        let this = self.clone();
        run_blocking(move || this.open(mode)).await
    }

    pub async fn delete_async(&self, handling: FileDeletion, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        let this = self.clone();
        run_blocking(move || this.delete(handling)).await
    }

    pub async fn size_async(&self, cancel: &CancellationToken) -> Result<u64> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        let this = self.clone();
        run_blocking(move || this.size()).await
    }

    pub async fn read_bytes_async(
        &self,
        offset: u64,
        count: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        let this = self.clone();
        run_blocking(move || this.read_bytes(offset, count)).await
    }

    pub async fn read_all_async(&self, cancel: &CancellationToken) -> Result<Vec<u8>> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        let this = self.clone();
        run_blocking(move || this.read_all()).await
    }

    pub async fn write_all_async(&self, data: Vec<u8>, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        let this = self.clone();
        run_blocking(move || this.write_all(&data)).await
    }

    pub async fn append_all_async(&self, data: Vec<u8>, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        let this = self.clone();
        run_blocking(move || this.append_all(&data)).await
    }
}

/// Runs a blocking closure on tokio's blocking thread pool.
///
/// Once dispatched, cancellation is best-effort only (§5): the closure is not
/// interrupted mid-syscall, it simply runs to completion.
async fn run_blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Cancelled),
    }
}
