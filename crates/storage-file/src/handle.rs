use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use store_error::{Result, StoreError};

/// An owned, scoped handle to an open file.
///
/// `Drop` flushes any buffered writes and syncs the OS handle so a caller
/// that forgets to call [`close`](FileHandle::close) — including on a panic
/// unwind — never loses an acknowledged write.
pub struct FileHandle {
    path: PathBuf,
    file: Option<File>,
}

impl FileHandle {
    pub(crate) fn new(path: PathBuf, file: File) -> Self {
        Self {
            path,
            file: Some(file),
        }
    }

    fn file_ref(&self) -> &File {
        self.file.as_ref().expect("FileHandle used after close")
    }

    fn file_mut_ref(&mut self) -> &mut File {
        self.file.as_mut().expect("FileHandle used after close")
    }

    /// Borrows the underlying [`File`] for direct `Read`/`Write` use.
    pub fn file_mut(&mut self) -> &mut File {
        self.file_mut_ref()
    }

    pub fn position(&mut self) -> Result<u64> {
        self.file_mut_ref()
            .stream_position()
            .map_err(|e| StoreError::io(self.path.clone(), e))
    }

    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.file_mut_ref()
            .seek(pos)
            .map_err(|e| StoreError::io(self.path.clone(), e))
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.file_mut_ref()
            .read_exact(buf)
            .map_err(|e| StoreError::io(self.path.clone(), e))
    }

    pub fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.file_mut_ref()
            .write_all(buf)
            .map_err(|e| StoreError::io(self.path.clone(), e))
    }

    pub fn flush(&mut self) -> Result<()> {
        self.file_mut_ref()
            .flush()
            .map_err(|e| StoreError::io(self.path.clone(), e))
    }

    /// Flushes, syncs, and releases the handle explicitly. Equivalent to
    /// dropping the handle, but surfaces I/O errors to the caller instead of
    /// swallowing them.
    pub fn close(mut self) -> Result<()> {
        self.flush()?;
        self.file_ref()
            .sync_all()
            .map_err(|e| StoreError::io(self.path.clone(), e))?;
        self.file.take();
        Ok(())
    }
}

impl Drop for FileHandle {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.sync_all();
        }
    }
}

impl Read for FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file_mut_ref().read(buf)
    }
}

impl Write for FileHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file_mut_ref().write(buf)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.file_mut_ref().flush()
    }
}

impl Seek for FileHandle {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.file_mut_ref().seek(pos)
    }
}
