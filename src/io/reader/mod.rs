/*! Source reading utilities

Sources are line-delimited JSON files, plain or gzipped, read lazily in fixed-size [Chunk]s.
!*/
mod chunks;

pub use chunks::{open_source, Chunk, ChunkReader, SourceReader};
