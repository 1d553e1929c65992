/*!
# IO utilities

Chunked reading of line-delimited JSON sources and durable writing of
newline-delimited batch files.
!*/
pub mod reader;
pub mod writer;

pub use reader::{Chunk, ChunkReader};
pub use writer::{AtomicWriter, JsonLinesWriter};
