/*! Checkpoint store

The checkpoint is the index of the last chunk whose processed records have been durably flushed.
It lives in a plain text file holding a single decimal integer.

A missing file is the normal cold-start case and reads as `None` ("nothing processed").
Writes go through [AtomicWriter], and must only happen once the output batch they certify has been persisted.
!*/
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::Error;
use crate::io::AtomicWriter;

#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the last completed chunk index, or `None` if no chunk has been flushed yet.
    ///
    /// Negative values and empty files are read as `None`.
    pub fn read(&self) -> Result<Option<usize>, Error> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no checkpoint at {:?}, starting from scratch", self.path);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let content = content.trim();
        if content.is_empty() {
            warn!("empty checkpoint file {:?}, starting from scratch", self.path);
            return Ok(None);
        }

        let index: i64 = content.parse().map_err(|e| {
            Error::Custom(format!(
                "invalid checkpoint {:?} in {:?}: {}",
                content, self.path, e
            ))
        })?;

        Ok(usize::try_from(index).ok())
    }

    /// Durably record `index` as the last flushed chunk.
    pub fn write(&self, index: usize) -> Result<(), Error> {
        let mut writer = AtomicWriter::new(&self.path)?;
        write!(writer, "{}", index)?;
        writer.finish()?;

        debug!("checkpoint {:?} set to {}", self.path, index);
        Ok(())
    }
}
