//! Streaming copy of a single file between two backends.

use crate::backend::Storage;
use crate::error::Result;

/// Copy `from` on `src` to `to` on `dst` in chunks of at most `chunk_size`
/// bytes.
///
/// The first chunk is written with truncate semantics, every later chunk
/// with append semantics, so at most one chunk is held in memory. An empty
/// source still produces an empty destination file. The destination's write
/// handle is released before returning, so copying the same file again
/// overwrites rather than grows the destination.
///
/// # Arguments
///
/// * `src` - Backend to read from
/// * `from` - Source path on `src`
/// * `dst` - Backend to write to
/// * `to` - Destination path on `dst`
/// * `chunk_size` - Maximum bytes per read and per write
///
/// # Returns
///
/// Number of bytes copied.
///
/// # Errors
///
/// Returns an error if:
/// - The source does not exist ([`Error::NotFound`](crate::Error::NotFound))
/// - Reading or writing fails ([`Error::Io`](crate::Error::Io))
/// - Either backend does not support the operation ([`Error::Unsupported`](crate::Error::Unsupported))
pub fn copy_file<S, D>(
    src: &S,
    from: &str,
    dst: &mut D,
    to: &str,
    chunk_size: usize,
) -> Result<u64>
where
    S: Storage + ?Sized,
    D: Storage + ?Sized,
{
    let mut chunks = src.read(from, chunk_size)?;

    let Some(first) = chunks.next() else {
        tracing::debug!(from, to, "source is empty");
        dst.write(to, &[], false)?;
        dst.finish_write()?;
        return Ok(0);
    };

    let first = first?;
    dst.write(to, &first, false)?;
    let mut bytes = first.len() as u64;

    for chunk in chunks {
        let chunk = chunk?;
        dst.write(to, &chunk, true)?;
        bytes += chunk.len() as u64;
    }

    dst.finish_write()?;
    tracing::info!(from, to, bytes, "copied file");
    Ok(bytes)
}

// =============================================================================
// Tests
// =============================================================================
