//! Remote backend over a stateful session.
//!
//! The wire protocol is not implemented here. A [`Connector`] establishes a
//! [`RemoteSession`], which supplies the primitive operations: open a file
//! for reading, open a file for truncating/appending writes, and walk a
//! directory tree. The production implementation is
//! [`SftpConnector`](super::SftpConnector).
//!
//! Connections are shared: a [`SharedConnection`] is handed out by the
//! [`SessionRegistry`](crate::SessionRegistry) to every backend with the
//! same address, user, and port. It connects when the first backend enters
//! its scope and disconnects when the last one leaves. Write handles are
//! never shared; each [`RemoteBackend`] owns its own.

use super::Storage;
use super::writer::WriteSlot;
use crate::error::{Error, Result};
use crate::job::BackendKind;
use crate::stream::ChunkStream;
use crate::utils::path::relative_to;
use std::cell::RefCell;
use std::fmt;
use std::io::{self, Read, Write};
use std::rc::Rc;

/// Primitive file operations of an established remote session.
pub trait RemoteSession {
    /// Open `path` for sequential reading.
    fn open_read(&self, path: &str) -> io::Result<Box<dyn Read>>;

    /// Open `path` for writing, creating it if needed. Truncates unless
    /// `append` is set, in which case writes go to the end of the file.
    fn open_write(&self, path: &str, append: bool) -> io::Result<Box<dyn Write>>;

    /// Full paths of every regular file below `root`.
    fn walk_files(&self, root: &str) -> io::Result<Vec<String>>;

    /// End the session.
    fn close(&self) -> io::Result<()>;
}

/// Establishes remote sessions.
pub trait Connector {
    /// Connect and authenticate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the server cannot be reached or
    /// rejects the credentials.
    fn connect(&self, params: &RemoteParams) -> Result<Box<dyn RemoteSession>>;
}

/// Fully resolved connection parameters (no prompt sentinels left).
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteParams {
    /// Host name or IP
    pub address: String,
    /// TCP port
    pub port: u16,
    /// Login name
    pub username: String,
    /// Password
    pub password: String,
}

impl RemoteParams {
    /// `address:port`, as used for connecting and in error messages.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

impl fmt::Debug for RemoteParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteParams")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Default)]
struct LinkState {
    session: Option<Box<dyn RemoteSession>>,
    holders: usize,
}

/// A connection shared by every backend talking to the same server.
///
/// Lifecycle: disconnected until the first [`acquire`](Self::acquire),
/// connected while at least one holder remains, closed after the last
/// [`release`](Self::release). A later `acquire` opens a fresh session.
pub struct SharedConnection {
    params: RemoteParams,
    connector: Rc<dyn Connector>,
    state: RefCell<LinkState>,
}

impl SharedConnection {
    pub(crate) fn new(params: RemoteParams, connector: Rc<dyn Connector>) -> Self {
        Self {
            params,
            connector,
            state: RefCell::new(LinkState::default()),
        }
    }

    /// Connection parameters.
    #[must_use]
    pub fn params(&self) -> &RemoteParams {
        &self.params
    }

    /// Whether a session is currently established.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state.borrow().session.is_some()
    }

    /// Register a holder, connecting if this is the first one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if connecting fails; the holder is not
    /// registered in that case.
    pub fn acquire(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.session.is_none() {
            tracing::info!(
                endpoint = %self.params.endpoint(),
                user = %self.params.username,
                "connecting"
            );
            state.session = Some(self.connector.connect(&self.params)?);
        }
        state.holders += 1;
        Ok(())
    }

    /// Drop a holder, disconnecting after the last one. Releasing with no
    /// holders left is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the session fails to close cleanly.
    /// The session is considered closed either way.
    pub fn release(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.holders = state.holders.saturating_sub(1);
        if state.holders > 0 {
            return Ok(());
        }
        match state.session.take() {
            Some(session) => {
                tracing::info!(endpoint = %self.params.endpoint(), "disconnecting");
                session.close().map_err(|e| Error::Connection {
                    address: self.params.endpoint(),
                    message: e.to_string(),
                })
            }
            None => Ok(()),
        }
    }

    /// Run `f` against the live session.
    fn with_session<T>(&self, f: impl FnOnce(&dyn RemoteSession) -> Result<T>) -> Result<T> {
        let state = self.state.borrow();
        match state.session.as_deref() {
            Some(session) => f(session),
            None => Err(Error::Connection {
                address: self.params.endpoint(),
                message: "not connected".to_owned(),
            }),
        }
    }
}

impl fmt::Debug for SharedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SharedConnection")
            .field("params", &self.params)
            .field("connected", &state.session.is_some())
            .field("holders", &state.holders)
            .finish()
    }
}

/// Backend that reads and writes files on a remote server.
#[derive(Debug)]
pub struct RemoteBackend {
    link: Rc<SharedConnection>,
    writer: WriteSlot,
    entered: bool,
}

impl RemoteBackend {
    /// Create a backend over `link`. Nothing is connected until
    /// [`Storage::open`].
    #[must_use]
    pub fn new(link: Rc<SharedConnection>) -> Self {
        Self {
            link,
            writer: WriteSlot::default(),
            entered: false,
        }
    }

    /// The (possibly shared) connection this backend uses.
    #[must_use]
    pub fn connection(&self) -> &Rc<SharedConnection> {
        &self.link
    }
}

impl Storage for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Sftp
    }

    fn open(&mut self) -> Result<()> {
        if !self.entered {
            self.link.acquire()?;
            self.entered = true;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        // The handle must be flushed while the session is still up.
        let flushed = self.writer.release();
        let released = if self.entered {
            self.entered = false;
            self.link.release()
        } else {
            Ok(())
        };
        flushed.and(released)
    }

    fn read(&self, path: &str, chunk_size: usize) -> Result<ChunkStream> {
        let reader = self
            .link
            .with_session(|session| session.open_read(path).map_err(|e| Error::io(path, e)))?;
        Ok(ChunkStream::new(path, reader, chunk_size))
    }

    fn write(&mut self, path: &str, data: &[u8], append: bool) -> Result<()> {
        let link = &self.link;
        self.writer.write_with(path, data, append, |p, a| {
            link.with_session(|session| session.open_write(p, a).map_err(|e| Error::write(p, e)))
        })
    }

    fn finish_write(&mut self) -> Result<()> {
        self.writer.release()
    }

    fn list_recursive(&self, root: &str) -> Result<Vec<String>> {
        let full_paths = self
            .link
            .with_session(|session| session.walk_files(root).map_err(|e| Error::io(root, e)))?;
        Ok(full_paths
            .iter()
            .filter_map(|full| relative_to(root, full))
            .filter(|rel| !rel.is_empty())
            .collect())
    }
}
