//! Buffered temp file with delete-on-drop.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// A `.part` file being written. Removed on drop unless [`finalize`](Self::finalize) succeeded.
pub struct PartFile {
    writer: Option<BufWriter<File>>,
    temp_path: PathBuf,
    written: u64,
}

impl PartFile {
    /// Creates (or truncates) `temp_path`, buffering writes in `capacity`-byte chunks.
    pub fn create(temp_path: &Path, capacity: usize) -> io::Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)?;
        tracing::debug!(path = %temp_path.display(), "created temp file");
        Ok(Self {
            writer: Some(BufWriter::with_capacity(capacity, file)),
            temp_path: temp_path.to_path_buf(),
            written: 0,
        })
    }

    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        let writer = self.writer.as_mut().ok_or_else(closed)?;
        writer.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flushes, fsyncs and renames the temp file onto `final_path`, replacing
    /// any existing file there. On error the temp file is removed.
    pub fn finalize(mut self, final_path: &Path) -> io::Result<()> {
        let writer = self.writer.take().ok_or_else(closed)?;
        let file = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&self.temp_path, final_path)?;
        // Renamed: nothing left for Drop to clean up.
        self.temp_path = PathBuf::new();
        tracing::debug!(path = %final_path.display(), bytes = self.written, "finalized download");
        Ok(())
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        drop(self.writer.take());
        if self.temp_path.as_os_str().is_empty() {
            return;
        }
        match fs::remove_file(&self.temp_path) {
            Ok(()) => tracing::debug!(path = %self.temp_path.display(), "removed temp file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.temp_path.display(), "failed to remove temp file: {e}"),
        }
    }
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "temp file already closed")
}
