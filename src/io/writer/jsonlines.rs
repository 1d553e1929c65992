/*! Newline-delimited JSON writer.

One record per line, written through an [AtomicWriter] so that the file only appears once complete.
!*/
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Error;

use super::AtomicWriter;

pub struct JsonLinesWriter {
    handle: AtomicWriter,
    nb_records: usize,
}

impl JsonLinesWriter {
    pub fn create(dst: &Path) -> Result<Self, Error> {
        Ok(Self {
            handle: AtomicWriter::new(dst)?,
            nb_records: 0,
        })
    }

    /// Serialize and write the provided records, in order.
    pub fn write<T: Serialize>(&mut self, records: &[T]) -> Result<(), Error> {
        for record in records {
            self.write_single(record)?;
        }
        Ok(())
    }

    pub fn write_single<T: Serialize>(&mut self, record: &T) -> Result<(), Error> {
        serde_json::to_writer(&mut self.handle, record)?;
        self.handle.write_all(b"\n")?;
        self.nb_records += 1;
        Ok(())
    }

    /// Write an already serialized record.
    ///
    /// `line` must not contain a newline.
    pub fn write_raw(&mut self, line: &str) -> Result<(), Error> {
        self.handle.write_all(line.as_bytes())?;
        self.handle.write_all(b"\n")?;
        self.nb_records += 1;
        Ok(())
    }

    pub fn nb_records(&self) -> usize {
        self.nb_records
    }

    /// Persist the file, returning its path and the number of records written.
    pub fn finish(self) -> Result<(PathBuf, usize), Error> {
        let path = self.handle.finish()?;
        Ok((path, self.nb_records))
    }
}
