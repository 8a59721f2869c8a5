//! Local disk backend.

use super::Storage;
use super::writer::WriteSlot;
use crate::error::{Error, Result};
use crate::job::BackendKind;
use crate::stream::ChunkStream;
use crate::utils::path::{safe_path, to_slash};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use walkdir::WalkDir;

/// Reads and writes files on the local filesystem.
///
/// There is no connection; opening and closing only concern the cached
/// write handle.
#[derive(Debug, Default)]
pub struct LocalBackend {
    writer: WriteSlot,
    /// Whether to fsync each file when its write handle is closed
    sync_files: bool,
}

impl LocalBackend {
    /// Create a local backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sync file contents to disk before each write handle is closed.
    #[must_use]
    pub fn with_fsync(mut self) -> Self {
        self.sync_files = true;
        self
    }

    fn open_writer(path: &str, append: bool, sync_files: bool) -> Result<Box<dyn Write>> {
        let target = safe_path(path);
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| Error::write(path, e))?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&target)
            .map_err(|e| Error::write(path, e))?;

        if sync_files {
            Ok(Box::new(SyncOnFlush(file)))
        } else {
            Ok(Box::new(file))
        }
    }
}

/// File writer whose flush also syncs data to disk.
struct SyncOnFlush(File);

impl Write for SyncOnFlush {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.flush()?;
        self.0.sync_data()
    }
}

impl Storage for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.writer.release()
    }

    fn read(&self, path: &str, chunk_size: usize) -> Result<ChunkStream> {
        let file = File::open(safe_path(path)).map_err(|e| Error::io(path, e))?;
        Ok(ChunkStream::new(path, Box::new(file), chunk_size))
    }

    fn write(&mut self, path: &str, data: &[u8], append: bool) -> Result<()> {
        let sync_files = self.sync_files;
        self.writer.write_with(path, data, append, |p, a| {
            Self::open_writer(p, a, sync_files)
        })
    }

    fn finish_write(&mut self) -> Result<()> {
        self.writer.release()
    }

    fn list_recursive(&self, root: &str) -> Result<Vec<String>> {
        let root_path = safe_path(root);
        if !root_path.exists() {
            return Err(Error::NotFound(root.to_owned()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&root_path).follow_links(false) {
            let entry = entry.map_err(|e| Error::io(root, e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&root_path)
                .unwrap_or_else(|_| Path::new(entry.file_name()));
            // A plain-file root strips to nothing.
            if rel.as_os_str().is_empty() {
                continue;
            }
            files.push(to_slash(rel));
        }
        Ok(files)
    }
}
