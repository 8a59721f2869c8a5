//! Folder copy: recursive listing on the source, one streamed copy per file.

use crate::backend::Storage;
use crate::error::Result;
use crate::utils::path::join_path;
use std::time::Instant;

use super::file::copy_file;

/// Statistics from a copy operation.
///
/// Returned by [`copy_folder`] and by [`run_job`](crate::run_job).
///
/// # Example
///
/// ```no_run
/// use ferry::backend::LocalBackend;
/// use ferry::copy_folder;
///
/// let src = LocalBackend::new();
/// let mut dst = LocalBackend::new();
/// let stats = copy_folder(&src, "photos", &mut dst, "backup/photos", 64 * 1024, |_, _, _| {})?;
/// println!("Copied {} files ({} bytes)", stats.files_copied, stats.bytes_copied);
/// # Ok::<(), ferry::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyStats {
    /// Number of files copied
    pub files_copied: u64,
    /// Number of folder mappings processed
    pub folders_copied: u64,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Duration of the copy operation
    pub duration: std::time::Duration,
}

impl CopyStats {
    /// Record one copied file.
    pub(crate) fn add_file(&mut self, bytes: u64) {
        self.files_copied += 1;
        self.bytes_copied += bytes;
    }

    /// Fold `other` into `self`.
    pub(crate) fn merge(&mut self, other: &Self) {
        self.files_copied += other.files_copied;
        self.folders_copied += other.folders_copied;
        self.bytes_copied += other.bytes_copied;
        self.duration += other.duration;
    }
}

/// Copy every file below `from_dir` on `src` to the same relative path
/// below `to_dir` on `dst`.
///
/// Files are copied in the order the source backend lists them, which is
/// not guaranteed to be stable. `on_file(from, to, bytes)` is called after
/// each file.
///
/// # Errors
///
/// Returns an error if:
/// - `from_dir` does not exist ([`Error::NotFound`](crate::Error::NotFound))
/// - Any single file copy fails; files copied before it are left in place
pub fn copy_folder<S, D, F>(
    src: &S,
    from_dir: &str,
    dst: &mut D,
    to_dir: &str,
    chunk_size: usize,
    mut on_file: F,
) -> Result<CopyStats>
where
    S: Storage + ?Sized,
    D: Storage + ?Sized,
    F: FnMut(&str, &str, u64),
{
    let start_time = Instant::now();
    let entries = src.list_recursive(from_dir)?;
    tracing::info!(from = from_dir, to = to_dir, files = entries.len(), "copying folder");

    let mut stats = CopyStats {
        folders_copied: 1,
        ..CopyStats::default()
    };
    for rel in &entries {
        let from = join_path(from_dir, rel);
        let to = join_path(to_dir, rel);
        let bytes = copy_file(src, &from, dst, &to, chunk_size)?;
        stats.add_file(bytes);
        on_file(&from, &to, bytes);
    }

    stats.duration = start_time.elapsed();
    Ok(stats)
}
