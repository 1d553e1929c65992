//! Pipelines.
//!
//! The module provides a light [pipeline::Pipeline] trait,
//! implemented by the resumable [ChunkedPipeline].
pub mod chunked;
#[allow(clippy::module_inception)]
pub mod pipeline;

pub use chunked::{starting_save_counter, ChunkedPipeline, PipelineConfig, RunSummary};
pub use pipeline::Pipeline;
