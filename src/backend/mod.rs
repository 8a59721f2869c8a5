//! Storage backends.
//!
//! Every storage location implements the [`Storage`] capability: lazy
//! chunked reads, truncating/appending writes through a single cached write
//! handle, and recursive listing. [`Backend`] is the closed set of variants a
//! job can resolve to.
//!
//! Construction never touches the network or the disk. Resources are
//! acquired by [`Backend::enter`], which returns a [`ScopedBackend`] guard
//! that releases them again on every exit path:
//!
//! ```no_run
//! use ferry::backend::{Backend, LocalBackend, Storage};
//!
//! let mut dst = Backend::Local(LocalBackend::new()).enter()?;
//! dst.write("out/data.bin", b"hello", false)?;
//! dst.write("out/data.bin", b" world", true)?;
//! dst.exit()?; // flushes and closes the write handle
//! # Ok::<(), ferry::Error>(())
//! ```

mod cloud;
mod local;
mod remote;
#[cfg(feature = "sftp")]
mod sftp;
mod writer;

pub use cloud::CloudBackend;
pub use local::LocalBackend;
pub use remote::{Connector, RemoteBackend, RemoteParams, RemoteSession, SharedConnection};
#[cfg(feature = "sftp")]
#[cfg_attr(docsrs, doc(cfg(feature = "sftp")))]
pub use sftp::SftpConnector;

use crate::error::Result;
use crate::job::BackendKind;
use crate::stream::ChunkStream;
use std::ops::{Deref, DerefMut};

/// The capability every storage backend provides.
pub trait Storage {
    /// Backend type key, for logs and errors.
    fn kind(&self) -> BackendKind;

    /// Acquire the backend's resources (e.g. connect). Called once on scope entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`](crate::Error::Connection) if a remote
    /// session cannot be established.
    fn open(&mut self) -> Result<()>;

    /// Flush and close the write handle and release the connection.
    ///
    /// Closing an already closed backend is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the first flush or disconnect failure; all resources are
    /// released regardless.
    fn close(&mut self) -> Result<()>;

    /// Start a lazy chunked read of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if `path` does not exist.
    fn read(&self, path: &str, chunk_size: usize) -> Result<ChunkStream>;

    /// Write `data` to `path`, truncating first unless `append` is set.
    ///
    /// The write handle stays open while consecutive calls use the same
    /// `(path, append)` pair; any other pair closes it first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if opening or writing fails.
    fn write(&mut self, path: &str, data: &[u8], append: bool) -> Result<()>;

    /// Flush and drop the cached write handle, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the flush fails.
    fn finish_write(&mut self) -> Result<()>;

    /// List every regular file below `root`, relative to `root`, `/` separated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if `root` does not exist.
    fn list_recursive(&self, root: &str) -> Result<Vec<String>>;
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn kind(&self) -> BackendKind {
        (**self).kind()
    }

    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn read(&self, path: &str, chunk_size: usize) -> Result<ChunkStream> {
        (**self).read(path, chunk_size)
    }

    fn write(&mut self, path: &str, data: &[u8], append: bool) -> Result<()> {
        (**self).write(path, data, append)
    }

    fn finish_write(&mut self) -> Result<()> {
        (**self).finish_write()
    }

    fn list_recursive(&self, root: &str) -> Result<Vec<String>> {
        (**self).list_recursive(root)
    }
}

/// A storage location resolved from a job's role.
#[derive(Debug)]
pub enum Backend {
    /// Local disk
    Local(LocalBackend),
    /// SFTP server
    Remote(RemoteBackend),
    /// Cloud object storage stub
    Cloud(CloudBackend),
}

impl Backend {
    /// Open the backend and return a guard that closes it when dropped.
    ///
    /// # Errors
    ///
    /// Returns the error from [`Storage::open`].
    pub fn enter(self) -> Result<ScopedBackend<Self>> {
        ScopedBackend::enter(self)
    }

    fn inner(&self) -> &dyn Storage {
        match self {
            Self::Local(b) => b,
            Self::Remote(b) => b,
            Self::Cloud(b) => b,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Storage {
        match self {
            Self::Local(b) => b,
            Self::Remote(b) => b,
            Self::Cloud(b) => b,
        }
    }
}

impl Storage for Backend {
    fn kind(&self) -> BackendKind {
        self.inner().kind()
    }

    fn open(&mut self) -> Result<()> {
        self.inner_mut().open()
    }

    fn close(&mut self) -> Result<()> {
        self.inner_mut().close()
    }

    fn read(&self, path: &str, chunk_size: usize) -> Result<ChunkStream> {
        self.inner().read(path, chunk_size)
    }

    fn write(&mut self, path: &str, data: &[u8], append: bool) -> Result<()> {
        self.inner_mut().write(path, data, append)
    }

    fn finish_write(&mut self) -> Result<()> {
        self.inner_mut().finish_write()
    }

    fn list_recursive(&self, root: &str) -> Result<Vec<String>> {
        self.inner().list_recursive(root)
    }
}

/// An open backend. Closes the backend when dropped.
///
/// Prefer [`ScopedBackend::exit`] on the success path so close failures
/// (e.g. a flush that fails) surface as errors; on drop they can only be
/// logged.
#[derive(Debug)]
pub struct ScopedBackend<S: Storage> {
    inner: S,
    open: bool,
}

impl<S: Storage> ScopedBackend<S> {
    /// Open `inner` and guard it.
    ///
    /// # Errors
    ///
    /// Returns the error from [`Storage::open`]; nothing is left open.
    pub fn enter(mut inner: S) -> Result<Self> {
        inner.open()?;
        tracing::debug!(backend = inner.kind().as_str(), "backend opened");
        Ok(Self { inner, open: true })
    }

    /// Close the backend, reporting any failure.
    ///
    /// # Errors
    ///
    /// Returns the error from [`Storage::close`].
    pub fn exit(mut self) -> Result<()> {
        self.open = false;
        let result = self.inner.close();
        tracing::debug!(backend = self.inner.kind().as_str(), "backend closed");
        result
    }
}

impl<S: Storage> Deref for ScopedBackend<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.inner
    }
}

impl<S: Storage> DerefMut for ScopedBackend<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl<S: Storage> Drop for ScopedBackend<S> {
    fn drop(&mut self) {
        if self.open {
            self.open = false;
            if let Err(e) = self.inner.close() {
                tracing::warn!(
                    backend = self.inner.kind().as_str(),
                    error = %e,
                    "failed to close backend"
                );
            }
        }
    }
}
