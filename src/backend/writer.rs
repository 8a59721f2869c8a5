//! The single cached write handle shared by the local and remote backends.

use crate::error::{Error, Result};
use std::io::Write;

/// An open output stream bound to one `(path, append)` pair.
struct WriteHandle {
    path: String,
    append: bool,
    writer: Box<dyn Write>,
}

impl WriteHandle {
    fn close(mut self) -> Result<()> {
        tracing::debug!(path = %self.path, append = self.append, "closing write handle");
        // Dropping the writer on return closes the underlying file.
        self.writer
            .flush()
            .map_err(|e| Error::write(&self.path, e))
    }
}

/// Holds at most one open write handle.
///
/// A write for the pair the current handle is bound to reuses it; any other
/// pair closes the current handle before opening a new one.
#[derive(Default)]
pub(crate) struct WriteSlot {
    current: Option<WriteHandle>,
}

impl WriteSlot {
    /// Write `data` through the handle for `(path, append)`, opening it with
    /// `open` if the current handle is bound to a different pair.
    pub(crate) fn write_with<F>(
        &mut self,
        path: &str,
        data: &[u8],
        append: bool,
        open: F,
    ) -> Result<()>
    where
        F: FnOnce(&str, bool) -> Result<Box<dyn Write>>,
    {
        let handle = match self.current.take() {
            Some(handle) if handle.path == path && handle.append == append => handle,
            previous => {
                if let Some(previous) = previous {
                    previous.close()?;
                }
                tracing::debug!(path, append, "opening write handle");
                WriteHandle {
                    path: path.to_owned(),
                    append,
                    writer: open(path, append)?,
                }
            }
        };

        let handle = self.current.insert(handle);
        handle
            .writer
            .write_all(data)
            .map_err(|e| Error::write(path, e))
    }

    /// Flush and close the current handle, if any.
    pub(crate) fn release(&mut self) -> Result<()> {
        match self.current.take() {
            Some(handle) => handle.close(),
            None => Ok(()),
        }
    }

    /// Path and mode of the open handle.
    pub(crate) fn bound_to(&self) -> Option<(&str, bool)> {
        self.current.as_ref().map(|h| (h.path.as_str(), h.append))
    }
}

impl std::fmt::Debug for WriteSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteSlot")
            .field("bound_to", &self.bound_to())
            .finish()
    }
}
