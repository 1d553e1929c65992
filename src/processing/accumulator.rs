/*! Batch accumulation and flushing

Processed chunks are buffered in memory until the pipeline decides to flush them.
A flush concatenates every pending chunk, in order, into a single newline-delimited JSON file
named `{output_prefix}{save_counter}.json`.
!*/
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::Error;
use crate::io::JsonLinesWriter;

use super::filter::ProcessedChunk;

/// Periodic flush cadence: true when `chunk_index` is a multiple of `save_interval`.
///
/// Chunk 0 is always flushed on its own.
pub fn should_flush(chunk_index: usize, save_interval: usize) -> bool {
    save_interval > 0 && chunk_index % save_interval == 0
}

/// `{output_prefix}{save_counter}.json`.
///
/// The prefix is used verbatim: `data/processed/processed_chunk_` gives `data/processed/processed_chunk_3.json`.
pub fn batch_path(output_prefix: &Path, save_counter: usize) -> PathBuf {
    let mut name = output_prefix.as_os_str().to_owned();
    name.push(format!("{}.json", save_counter));
    PathBuf::from(name)
}

/// A persisted batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flush {
    pub path: PathBuf,
    pub save_counter: usize,
    pub nb_records: usize,
    /// Source chunks contained in the batch.
    pub chunks: RangeInclusive<usize>,
}

/// In-memory buffer of processed chunks awaiting a flush.
#[derive(Debug, Default)]
pub struct Accumulator {
    pending: Vec<ProcessedChunk>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, chunk: ProcessedChunk) {
        self.pending.push(chunk);
    }

    /// true when no chunk is pending, even if pending chunks hold no records.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn nb_chunks(&self) -> usize {
        self.pending.len()
    }

    pub fn nb_records(&self) -> usize {
        self.pending.iter().map(ProcessedChunk::len).sum()
    }

    /// Indices of the first and last pending chunks.
    pub fn chunk_range(&self) -> Option<RangeInclusive<usize>> {
        match (self.pending.first(), self.pending.last()) {
            (Some(first), Some(last)) => Some(first.index()..=last.index()),
            _ => None,
        }
    }

    /// Write every pending record to the batch file for `save_counter`, then clear the buffer.
    ///
    /// The file is persisted before this returns, so a checkpoint can safely be written afterwards.
    /// On error the buffer is left untouched.
    pub fn flush(&mut self, output_prefix: &Path, save_counter: usize) -> Result<Flush, Error> {
        let chunks = self
            .chunk_range()
            .ok_or_else(|| Error::Custom("nothing to flush".to_string()))?;

        let path = batch_path(output_prefix, save_counter);
        let mut writer = JsonLinesWriter::create(&path)?;
        for chunk in &self.pending {
            writer.write(chunk.records())?;
        }
        let (path, nb_records) = writer.finish()?;

        info!(
            "flushed chunks {}..={} ({} records) to {:?}",
            chunks.start(),
            chunks.end(),
            nb_records,
            path
        );

        self.pending.clear();

        Ok(Flush {
            path,
            save_counter,
            nb_records,
            chunks,
        })
    }
}
