/*! Content processing

Contains structures and functions to filter, normalize, buffer and split review records.
!*/
pub mod accumulator;
pub mod filter;
pub mod review;
pub mod split;

pub use accumulator::{batch_path, should_flush, Accumulator, Flush};
pub use filter::{ChunkProcessor, LanguageFilter, ProcessedChunk};
pub use review::{Field, ProcessedReview, Projection, RawReview};
