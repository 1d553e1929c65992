//! # reviewprep
//!
//! Resumable preparation of large review corpora.
//!
//! Line-delimited JSON reviews (optionally gzipped) are streamed in fixed-size chunks,
//! filtered down to a target language, projected onto a typed schema and flushed to numbered batch files.
//! Progress is checkpointed after each flush, so that an interrupted run can be restarted without losing
//! or duplicating already flushed data.
//!
//! Processed batches can then be concatenated and split into train/test datasets.
pub mod checkpoint;
pub mod error;
pub mod identifiers;
pub mod io;
pub mod pipelines;
pub mod processing;
