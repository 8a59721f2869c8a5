//! Explicit registry of remote connections for one run.
//!
//! The registry is owned by the caller (normally the [`Runner`](crate::Runner))
//! and passed to the factory. Remote backends resolving to the same address,
//! user, and port receive the same [`SharedConnection`], so a run never opens
//! two sessions to one server at the same time.

use crate::backend::{Connector, RemoteParams, RemoteSession, SharedConnection};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Identity of a remote connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    /// Host name or IP
    pub address: String,
    /// Login name
    pub username: String,
    /// TCP port
    pub port: u16,
}

impl From<&RemoteParams> for SessionKey {
    fn from(params: &RemoteParams) -> Self {
        Self {
            address: params.address.clone(),
            username: params.username.clone(),
            port: params.port,
        }
    }
}

/// Connections handed out during one run, keyed by [`SessionKey`].
pub struct SessionRegistry {
    connector: Rc<dyn Connector>,
    links: HashMap<SessionKey, Rc<SharedConnection>>,
}

impl SessionRegistry {
    /// Create a registry that connects through `connector`.
    pub fn new(connector: impl Connector + 'static) -> Self {
        Self {
            connector: Rc::new(connector),
            links: HashMap::new(),
        }
    }

    /// Connection for `params`, reusing an existing one with the same key.
    ///
    /// The first registration for a key fixes its password; later lookups
    /// with the same key share that connection.
    pub fn connection(&mut self, params: RemoteParams) -> Rc<SharedConnection> {
        let key = SessionKey::from(&params);
        let connector = &self.connector;
        let link = self.links.entry(key).or_insert_with(|| {
            tracing::debug!(endpoint = %params.endpoint(), "registering remote connection");
            Rc::new(SharedConnection::new(params, Rc::clone(connector)))
        });
        Rc::clone(link)
    }

    /// Connection already registered under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &SessionKey) -> Option<Rc<SharedConnection>> {
        self.links.get(key).map(Rc::clone)
    }

    /// Number of distinct connections registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether no connection has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl Default for SessionRegistry {
    /// Registry using [`SftpConnector`](crate::backend::SftpConnector), or a
    /// connector that always fails when the `sftp` feature is disabled.
    fn default() -> Self {
        #[cfg(feature = "sftp")]
        {
            Self::new(crate::backend::SftpConnector)
        }
        #[cfg(not(feature = "sftp"))]
        {
            Self::new(UnavailableConnector)
        }
    }
}

impl fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("links", &self.links)
            .finish()
    }
}

/// Connector used when the crate is built without SFTP support.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableConnector;

impl Connector for UnavailableConnector {
    fn connect(&self, _params: &RemoteParams) -> Result<Box<dyn RemoteSession>> {
        Err(Error::Unsupported {
            backend: "sftp",
            operation: "connect (built without the `sftp` feature)",
        })
    }
}
