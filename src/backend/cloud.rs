//! Placeholder for cloud object storage. Every data operation fails with
//! [`Error::Unsupported`].

use super::Storage;
use crate::error::{Error, Result};
use crate::job::BackendKind;
use crate::stream::ChunkStream;

/// Cloud storage backend stub.
#[derive(Debug, Default)]
pub struct CloudBackend;

impl CloudBackend {
    /// Create the stub.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn unsupported<T>(operation: &'static str) -> Result<T> {
        Err(Error::Unsupported {
            backend: BackendKind::Cloud.as_str(),
            operation,
        })
    }
}

impl Storage for CloudBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Cloud
    }

    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn read(&self, _path: &str, _chunk_size: usize) -> Result<ChunkStream> {
        Self::unsupported("read")
    }

    fn write(&mut self, _path: &str, _data: &[u8], _append: bool) -> Result<()> {
        Self::unsupported("write")
    }

    fn finish_write(&mut self) -> Result<()> {
        Ok(())
    }

    fn list_recursive(&self, _root: &str) -> Result<Vec<String>> {
        Self::unsupported("list")
    }
}
