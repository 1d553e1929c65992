//! Write-then-rename file writer.
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::error::Error;

/// Writer persisting its content to `dst` only when [AtomicWriter::finish] is called.
///
/// Dropping it without finishing removes the temporary file and leaves `dst` untouched.
pub struct AtomicWriter {
    handle: BufWriter<NamedTempFile>,
    dst: PathBuf,
}

impl AtomicWriter {
    /// Create a new [AtomicWriter] targeting `dst`.
    ///
    /// The parent directory is created if it does not exist.
    pub fn new(dst: &Path) -> Result<Self, Error> {
        let parent = match dst.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        if !parent.exists() {
            warn!("Destination directory {:?} does not exist. Creating", parent);
            std::fs::create_dir_all(&parent)?;
        }

        // same directory as dst, so that the final rename does not cross filesystems
        let tmp = NamedTempFile::new_in(&parent)?;

        Ok(Self {
            handle: BufWriter::new(tmp),
            dst: dst.to_path_buf(),
        })
    }

    pub fn dst(&self) -> &Path {
        &self.dst
    }

    /// Flush, sync to disk and atomically move the content to the destination.
    pub fn finish(self) -> Result<PathBuf, Error> {
        let tmp = self.handle.into_inner().map_err(|e| e.into_error())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.dst)?;

        debug!("persisted {:?}", self.dst);
        Ok(self.dst)
    }
}

impl Write for AtomicWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.handle.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.handle.flush()
    }
}
