//! Pull-based chunk streaming.

use crate::error::{Error, Result};
use std::io::Read;
use std::iter::FusedIterator;

/// Upper bound on the buffer reserved before a chunk is read; larger chunks
/// grow as data arrives.
const MAX_PREALLOC: usize = 64 * 1024;

/// Lazy, forward-only sequence of byte chunks read from a backend.
///
/// Every chunk is exactly `chunk_size` bytes except possibly the last one.
/// An empty source yields no chunks at all. The stream is exhausted after
/// the first short chunk, the first `None`, or the first error; it cannot be
/// restarted.
pub struct ChunkStream {
    reader: Option<Box<dyn Read>>,
    chunk_size: usize,
    path: String,
}

impl ChunkStream {
    /// Wrap `reader`. A `chunk_size` of zero is clamped to 1.
    pub fn new(path: impl Into<String>, reader: Box<dyn Read>, chunk_size: usize) -> Self {
        Self {
            reader: Some(reader),
            chunk_size: chunk_size.max(1),
            path: path.into(),
        }
    }

    /// Path the stream reads from.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the stream has been fully consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.reader.is_none()
    }
}

impl Iterator for ChunkStream {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;
        let mut buf = Vec::with_capacity(self.chunk_size.min(MAX_PREALLOC));
        let limit = u64::try_from(self.chunk_size).unwrap_or(u64::MAX);

        // read_to_end keeps filling across short reads, so chunk boundaries
        // depend only on chunk_size.
        let read = reader.by_ref().take(limit).read_to_end(&mut buf);
        if let Err(e) = read {
            self.reader = None;
            return Some(Err(Error::Io {
                path: self.path.clone(),
                source: e,
            }));
        }

        if buf.len() < self.chunk_size {
            self.reader = None;
            if buf.is_empty() {
                return None;
            }
        }
        Some(Ok(buf))
    }
}

impl FusedIterator for ChunkStream {}

impl std::fmt::Debug for ChunkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkStream")
            .field("path", &self.path)
            .field("chunk_size", &self.chunk_size)
            .field("exhausted", &self.is_exhausted())
            .finish()
    }
}
