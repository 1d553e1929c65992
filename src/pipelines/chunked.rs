//! Resumable chunked pipeline
//!
//! Streams a line-delimited source in fixed-size chunks, filters each chunk and periodically
//! flushes the accumulated records to numbered batch files, advancing a checkpoint after each flush.
//!
//! # Run
//! 1. The checkpoint (last flushed chunk) is read and the save counter restored from it.
//! 1. Chunks are read in order. Chunks at or below the checkpoint are skipped without being parsed.
//! 1. Other chunks are processed and buffered. When a chunk index is a multiple of the save interval,
//!    the buffer is flushed to `{output_prefix}{save_counter}.json` and the checkpoint is set to that index.
//! 1. Once the source is exhausted, remaining buffered chunks are flushed under the next save counter,
//!    *without* advancing the checkpoint.
//!
//! The checkpoint is only written after the batch it certifies has been persisted:
//! a run killed at any point resumes from the last flush, reprocessing at most one group of chunks.
//!
//! Since the tail batch is not checkpointed, a rerun after a completed run processes the tail again
//! and writes it under the same file name.
use std::io::BufRead;
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::checkpoint::StateFile;
use crate::error::Error;
use crate::io::reader::{open_source, ChunkReader};
use crate::processing::{should_flush, Accumulator, ChunkProcessor, Flush, Projection};

use super::Pipeline;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Line-delimited JSON source, plain or gzipped.
    pub src: PathBuf,
    /// Records per chunk.
    pub chunk_size: usize,
    /// Chunks between flushes.
    pub save_interval: usize,
    pub output_prefix: PathBuf,
    pub state_file: PathBuf,
    pub projection: Projection,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            src: PathBuf::from("data/raw/goodreads_reviews_dedup.json.gz"),
            chunk_size: 100_000,
            save_interval: 5,
            output_prefix: PathBuf::from("data/processed/processed_chunk_"),
            state_file: PathBuf::from("data/processed/processing_state.txt"),
            projection: Projection::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk size must be positive".to_string()));
        }
        if self.save_interval == 0 {
            return Err(Error::Config("save interval must be positive".to_string()));
        }
        if self.output_prefix.as_os_str().is_empty() {
            return Err(Error::Config("output prefix cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Number of batch files already written when the checkpoint is `checkpoint`.
///
/// Checkpoints are always multiples of `save_interval`, and chunk 0 is flushed on its own,
/// so checkpoint `c` means `c / save_interval + 1` flushes.
///
/// This only holds if the checkpoint was written with the same `save_interval`: resuming with another interval
/// can name a batch after an existing file and overwrite it.
pub fn starting_save_counter(checkpoint: Option<usize>, save_interval: usize) -> usize {
    match checkpoint {
        Some(c) => c / save_interval + 1,
        None => 0,
    }
}

/// Outcome of a run.
///
/// `skipped` and `processed` partition the chunk indices seen during the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub checkpoint_at_start: Option<usize>,
    pub skipped: Vec<usize>,
    pub processed: Vec<usize>,
    /// Periodic flushes, each followed by a checkpoint advance.
    pub flushes: Vec<Flush>,
    /// Flush of the tail, not checkpointed.
    pub final_flush: Option<Flush>,
    pub checkpoint: Option<usize>,
}

impl RunSummary {
    pub fn nb_records(&self) -> usize {
        self.flushes
            .iter()
            .chain(self.final_flush.iter())
            .map(|f| f.nb_records)
            .sum()
    }

    pub fn files(&self) -> Vec<&PathBuf> {
        self.flushes
            .iter()
            .chain(self.final_flush.iter())
            .map(|f| &f.path)
            .collect()
    }
}

pub struct ChunkedPipeline<P: ChunkProcessor> {
    config: PipelineConfig,
    processor: P,
}

impl<P: ChunkProcessor> ChunkedPipeline<P> {
    pub fn new(config: PipelineConfig, processor: P) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { config, processor })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run over an already opened source.
    ///
    /// `source` has to be read from its beginning: chunk indices are derived from read order.
    pub fn run_on<R: BufRead>(&self, source: R) -> Result<RunSummary, Error> {
        let save_interval = self.config.save_interval;
        let prefix = &self.config.output_prefix;

        let state = StateFile::new(&self.config.state_file);
        let checkpoint = state.read()?;
        let mut save_counter = starting_save_counter(checkpoint, save_interval);
        if let Some(c) = checkpoint.filter(|c| c % save_interval != 0) {
            warn!(
                "checkpoint {} is not a multiple of save interval {}: it was written with another interval, \
                 batch {} and later ones may overwrite existing files",
                c,
                save_interval,
                save_counter + 1
            );
        }
        info!(
            "starting from checkpoint {:?} (save counter {})",
            checkpoint, save_counter
        );

        let mut summary = RunSummary {
            checkpoint_at_start: checkpoint,
            checkpoint,
            ..Default::default()
        };
        let mut accumulator = Accumulator::new();

        for chunk in ChunkReader::new(source, self.config.chunk_size)? {
            let chunk = chunk?;
            let index = chunk.index();

            if checkpoint.map_or(false, |c| index <= c) {
                debug!("skipping chunk {}", index);
                summary.skipped.push(index);
                continue;
            }

            debug!("processing chunk {}", index);
            let processed = self.processor.process(chunk, &self.config.projection)?;
            accumulator.accumulate(processed);
            summary.processed.push(index);

            if should_flush(index, save_interval) {
                save_counter += 1;
                let flush = accumulator.flush(prefix, save_counter)?;
                state.write(index)?;
                info!("checkpoint advanced to chunk {}", index);

                summary.checkpoint = Some(index);
                summary.flushes.push(flush);
            }
        }

        if !accumulator.is_empty() {
            let flush = accumulator.flush(prefix, save_counter + 1)?;
            info!(
                "final flush of {} records to {:?} (checkpoint stays at {:?})",
                flush.nb_records, flush.path, summary.checkpoint
            );
            summary.final_flush = Some(flush);
        }

        info!(
            "done: {} chunks skipped, {} processed, {} records written",
            summary.skipped.len(),
            summary.processed.len(),
            summary.nb_records()
        );
        Ok(summary)
    }
}

impl<P: ChunkProcessor> Pipeline<RunSummary> for ChunkedPipeline<P> {
    fn run(&self) -> Result<RunSummary, Error> {
        let source = open_source(&self.config.src)?;
        self.run_on(source)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::path::Path;

    use super::*;
    use crate::io::Chunk;
    use crate::processing::{ProcessedChunk, ProcessedReview};

    /// Keeps every line, using its `id` as user id, and records which chunks it saw.
    #[derive(Default)]
    struct KeepAll {
        seen: RefCell<Vec<usize>>,
    }

    #[derive(serde::Deserialize)]
    struct Line {
        id: usize,
    }

    impl ChunkProcessor for KeepAll {
        fn process(&self, chunk: Chunk, _: &Projection) -> Result<ProcessedChunk, Error> {
            self.seen.borrow_mut().push(chunk.index());
            let records = chunk
                .parse::<Line>()?
                .into_iter()
                .map(|l| ProcessedReview {
                    user_id: Some(l.id.to_string()),
                    book_id: None,
                    review_id: None,
                    rating: None,
                    review_text: None,
                    date_added: None,
                    date_updated: None,
                    read_at: None,
                    started_at: None,
                    n_votes: None,
                    n_comments: None,
                    lang: "en".to_string(),
                })
                .collect();
            Ok(ProcessedChunk::new(chunk.index(), records))
        }
    }

    fn source(nb: usize) -> Cursor<String> {
        Cursor::new((0..nb).map(|i| format!("{{\"id\":{}}}\n", i)).collect())
    }

    fn config(dir: &Path, chunk_size: usize, save_interval: usize) -> PipelineConfig {
        PipelineConfig {
            src: dir.join("unused.json"),
            chunk_size,
            save_interval,
            output_prefix: dir.join("out").join("output_"),
            state_file: dir.join("state.txt"),
            projection: Projection::default(),
        }
    }

    #[test]
    fn test_starting_save_counter() {
        assert_eq!(starting_save_counter(None, 5), 0);
        assert_eq!(starting_save_counter(Some(0), 5), 1);
        assert_eq!(starting_save_counter(Some(5), 5), 2);
        assert_eq!(starting_save_counter(Some(10), 5), 3);
        // save interval of 1: (c + 1) / 1
        assert_eq!(starting_save_counter(Some(2), 1), 3);
    }

    #[test]
    fn test_resume_with_other_save_interval() {
        let dst = tempfile::tempdir().unwrap();
        // written with a save interval of 2
        StateFile::new(dst.path().join("state.txt")).write(4).unwrap();

        let p = ChunkedPipeline::new(config(dst.path(), 1, 5), KeepAll::default()).unwrap();
        let summary = p.run_on(source(7)).unwrap();

        assert_eq!(summary.skipped, vec![0, 1, 2, 3, 4]);
        assert_eq!(summary.processed, vec![5, 6]);
        // 4 / 5 + 1: the first batch is numbered as if a single flush happened
        assert_eq!(summary.flushes[0].save_counter, 2);
        assert_eq!(summary.flushes[0].chunks, 5..=5);
        assert_eq!(summary.checkpoint, Some(5));
        assert_eq!(summary.final_flush.as_ref().map(|f| f.save_counter), Some(3));
    }

    #[test]
    fn test_validate() {
        let dir = Path::new("unused");
        assert!(config(dir, 0, 5).validate().is_err());
        assert!(config(dir, 5, 0).validate().is_err());
        assert!(config(dir, 5, 5).validate().is_ok());
        assert!(ChunkedPipeline::new(config(dir, 5, 0), KeepAll::default()).is_err());
    }

    #[test]
    fn test_twelve_records_save_interval_one() {
        let dst = tempfile::tempdir().unwrap();
        let p = ChunkedPipeline::new(config(dst.path(), 5, 1), KeepAll::default()).unwrap();

        let summary = p.run_on(source(12)).unwrap();

        assert_eq!(summary.processed, vec![0, 1, 2]);
        assert!(summary.skipped.is_empty());
        let counters: Vec<usize> = summary.flushes.iter().map(|f| f.save_counter).collect();
        assert_eq!(counters, vec![1, 2, 3]);
        let sizes: Vec<usize> = summary.flushes.iter().map(|f| f.nb_records).collect();
        assert_eq!(sizes, vec![5, 5, 2]);
        // chunk 2 is flushed inline, nothing left for the final flush
        assert!(summary.final_flush.is_none());
        assert_eq!(summary.checkpoint, Some(2));
        assert_eq!(StateFile::new(dst.path().join("state.txt")).read().unwrap(), Some(2));

        for i in 1..=3 {
            assert!(dst.path().join("out").join(format!("output_{}.json", i)).exists());
        }
        assert!(!dst.path().join("out").join("output_4.json").exists());
    }

    #[test]
    fn test_flush_cadence() {
        let dst = tempfile::tempdir().unwrap();
        let p = ChunkedPipeline::new(config(dst.path(), 1, 5), KeepAll::default()).unwrap();

        // 13 chunks of one record
        let summary = p.run_on(source(13)).unwrap();

        let flushed: Vec<usize> = summary.flushes.iter().map(|f| *f.chunks.end()).collect();
        assert_eq!(flushed, vec![0, 5, 10]);
        let ranges: Vec<_> = summary.flushes.iter().map(|f| f.chunks.clone()).collect();
        assert_eq!(ranges, vec![0..=0, 1..=5, 6..=10]);

        let tail = summary.final_flush.unwrap();
        assert_eq!(tail.chunks, 11..=12);
        assert_eq!(tail.save_counter, 4);
        assert_eq!(summary.checkpoint, Some(10));
    }

    #[test]
    fn test_resume_skips_checkpointed_chunks() {
        let dst = tempfile::tempdir().unwrap();
        StateFile::new(dst.path().join("state.txt")).write(5).unwrap();

        let processor = KeepAll::default();
        let p = ChunkedPipeline::new(config(dst.path(), 2, 5), processor).unwrap();
        let summary = p.run_on(source(24)).unwrap();

        assert_eq!(summary.checkpoint_at_start, Some(5));
        assert_eq!(summary.skipped, (0..=5).collect::<Vec<_>>());
        assert_eq!(summary.processed, (6..12).collect::<Vec<_>>());
        assert_eq!(*p.processor.seen.borrow(), (6..12).collect::<Vec<_>>());

        // two files (chunk 0, chunks 1..=5) were written by earlier runs
        assert_eq!(summary.flushes[0].save_counter, 3);
        assert_eq!(summary.flushes[0].chunks, 6..=10);
        assert_eq!(summary.final_flush.as_ref().unwrap().save_counter, 4);
        assert_eq!(summary.checkpoint, Some(10));
    }

    #[test]
    fn test_everything_checkpointed() {
        let dst = tempfile::tempdir().unwrap();
        StateFile::new(dst.path().join("state.txt")).write(10).unwrap();

        let p = ChunkedPipeline::new(config(dst.path(), 5, 5), KeepAll::default()).unwrap();
        let summary = p.run_on(source(12)).unwrap();

        assert_eq!(summary.skipped, vec![0, 1, 2]);
        assert!(summary.processed.is_empty());
        assert!(summary.flushes.is_empty());
        assert!(summary.final_flush.is_none());
        assert_eq!(summary.checkpoint, Some(10));
    }

    #[test]
    fn test_skipped_chunks_not_parsed() {
        let dst = tempfile::tempdir().unwrap();
        StateFile::new(dst.path().join("state.txt")).write(0).unwrap();

        // first chunk is garbage, but it is already checkpointed
        let data = "garbage\nmore garbage\n{\"id\":2}\n{\"id\":3}\n";
        let p = ChunkedPipeline::new(config(dst.path(), 2, 5), KeepAll::default()).unwrap();
        let summary = p.run_on(Cursor::new(data)).unwrap();

        assert_eq!(summary.skipped, vec![0]);
        assert_eq!(summary.processed, vec![1]);
    }

    #[test]
    fn test_empty_source() {
        let dst = tempfile::tempdir().unwrap();
        let p = ChunkedPipeline::new(config(dst.path(), 5, 5), KeepAll::default()).unwrap();
        let summary = p.run_on(source(0)).unwrap();

        assert_eq!(summary, RunSummary::default());
        assert!(!dst.path().join("state.txt").exists());
    }

    #[test]
    fn test_run_from_path() {
        let dst = tempfile::tempdir().unwrap();
        let mut config = config(dst.path(), 4, 1);
        config.src = dst.path().join("reviews.json");
        std::fs::write(&config.src, source(6).into_inner()).unwrap();

        let p = ChunkedPipeline::new(config, KeepAll::default()).unwrap();
        let summary = p.run().unwrap();
        assert_eq!(summary.nb_records(), 6);
        assert_eq!(summary.files().len(), 2);
    }

    #[test]
    fn test_missing_source() {
        let dst = tempfile::tempdir().unwrap();
        let p = ChunkedPipeline::new(config(dst.path(), 4, 1), KeepAll::default()).unwrap();
        assert!(matches!(p.run(), Err(Error::Io(_))));
    }
}
