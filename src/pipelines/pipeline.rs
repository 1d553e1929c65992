//! Pipeline trait.
use crate::error::Error;

/// A runnable pipeline, generic over what a run reports back
/// (e.g. [super::RunSummary] for [super::ChunkedPipeline]).
pub trait Pipeline<T> {
    fn run(&self) -> Result<T, Error>;
}
