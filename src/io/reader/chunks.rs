/*! Chunked line reader.

Yields [Chunk]s of at most `chunk_size` records, numbered from 0 in read order.
Nothing but the current chunk is held in memory.
!*/
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use log::debug;
use serde::de::DeserializeOwned;

use crate::error::Error;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// An ordered batch of raw records, still in their JSON line form.
///
/// Lines are only parsed by [Chunk::parse], so that chunks that are skipped are never deserialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    index: usize,
    lines: Vec<String>,
}

impl Chunk {
    pub fn new(index: usize, lines: Vec<String>) -> Self {
        Self { index, lines }
    }

    /// Zero-based position of the chunk in the source.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        self.lines.as_ref()
    }

    /// Deserialize every line of the chunk.
    ///
    /// Fails on the first line that does not deserialize into `T`,
    /// reporting its offset inside the chunk.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        self.lines
            .iter()
            .enumerate()
            .map(|(offset, line)| {
                serde_json::from_str(line).map_err(|source| Error::Record {
                    chunk: self.index,
                    offset,
                    source,
                })
            })
            .collect()
    }
}

/// Lazy, consume-once sequence of [Chunk]s over a line-delimited source.
///
/// Blank lines are ignored and do not count towards the chunk size.
/// Restarting means building a new reader over a freshly opened source.
#[derive(Debug)]
pub struct ChunkReader<R>
where
    R: BufRead,
{
    lines: Lines<R>,
    chunk_size: usize,
    next_index: usize,
    done: bool,
}

pub type SourceReader = ChunkReader<Box<dyn BufRead + Send>>;

/// Open a source file, transparently decoding gzip content.
///
/// Compression is detected from the gzip magic bytes, not from the file extension.
/// Multi-member gzip files are supported.
pub fn open_source(src: &Path) -> Result<Box<dyn BufRead + Send>, Error> {
    let file = File::open(src)?;
    let mut reader = BufReader::new(file);
    let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);

    if is_gzip {
        debug!("reading {:?} as gzip", src);
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        debug!("reading {:?} as plain text", src);
        Ok(Box::new(reader))
    }
}

impl SourceReader {
    pub fn from_path(src: &Path, chunk_size: usize) -> Result<Self, Error> {
        Self::new(open_source(src)?, chunk_size)
    }
}

impl<R: BufRead> ChunkReader<R> {
    pub fn new(reader: R, chunk_size: usize) -> Result<Self, Error> {
        if chunk_size == 0 {
            return Err(Error::Config("chunk size must be positive".to_string()));
        }

        Ok(Self {
            lines: reader.lines(),
            chunk_size,
            next_index: 0,
            done: false,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl<R: BufRead> Iterator for ChunkReader<R> {
    type Item = Result<Chunk, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut lines = Vec::with_capacity(self.chunk_size);
        while lines.len() < self.chunk_size {
            match self.lines.next() {
                Some(Ok(line)) => {
                    if !line.trim().is_empty() {
                        lines.push(line);
                    }
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(Error::Io(e)));
                }
                None => {
                    self.done = true;
                    break;
                }
            }
        }

        if lines.is_empty() {
            return None;
        }

        let chunk = Chunk::new(self.next_index, lines);
        self.next_index += 1;
        Some(Ok(chunk))
    }
}
