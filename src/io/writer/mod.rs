/*!
# Durable file writing

Files are never written in place: content goes to a temporary file living in the destination directory,
which is synced and then renamed over the destination by [AtomicWriter::finish].
A crash at any point leaves either the previous file or the complete new one, never a truncated file.

[JsonLinesWriter] builds newline-delimited JSON files on top of [AtomicWriter].
!*/
mod atomic;
mod jsonlines;

pub use atomic::AtomicWriter;
pub use jsonlines::JsonLinesWriter;
