//! Job specification: what to copy, from where, to where.
//!
//! A job file is a JSON document:
//!
//! ```
//! use ferry::JobSpec;
//!
//! let spec = JobSpec::from_json(r#"{
//!     "from": "local",
//!     "to": { "type": "sftp", "address": "backup.example", "username": "prompt", "password": "prompt" },
//!     "files": [ { "from": "notes.txt", "to": "/srv/backup/notes.txt" } ],
//!     "folders": [ { "from": "photos", "to": "/srv/backup/photos" } ],
//!     "maxbytes": 65536
//! }"#)?;
//! assert_eq!(spec.maxbytes, 65536);
//! # Ok::<(), ferry::Error>(())
//! ```
//!
//! A role (`from` / `to`) is either a bare type key or an object carrying the
//! type key plus that backend's parameters. An unknown or missing type key
//! resolves to the local disk.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Credential value requesting interactive entry at run time.
pub const PROMPT_SENTINEL: &str = "prompt";

/// Port used for remote backends that do not declare one.
pub const DEFAULT_SFTP_PORT: u16 = 22;

/// Which side of a job a backend plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Source side
    From,
    /// Destination side
    To,
}

impl Role {
    /// Key used for this role in job files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::From => "from",
            Self::To => "to",
        }
    }
}

/// Concrete backend variant selected by a role's type key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Local disk (also the fallback for unknown keys)
    Local,
    /// Remote server over SFTP
    Sftp,
    /// Cloud object storage (not implemented)
    Cloud,
}

impl BackendKind {
    /// Map a type key to a backend kind.
    ///
    /// Unknown and missing keys degrade to [`BackendKind::Local`].
    #[must_use]
    pub fn from_key(key: Option<&str>) -> Self {
        match key.map(str::trim) {
            Some(k) if k.eq_ignore_ascii_case("sftp") => Self::Sftp,
            Some(k) if k.eq_ignore_ascii_case("cloud") => Self::Cloud,
            Some(k) if k.eq_ignore_ascii_case("local") => Self::Local,
            Some(other) => {
                tracing::warn!(backend = other, "unknown backend type, using local disk");
                Self::Local
            }
            None => Self::Local,
        }
    }

    /// Type key for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Sftp => "sftp",
            Self::Cloud => "cloud",
        }
    }
}

/// Type key and parameters for one role of a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRole")]
pub struct RoleSpec {
    /// Backend type key (`local`, `sftp`, `cloud`)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Remote host name or IP
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Login name, or [`PROMPT_SENTINEL`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Password, or [`PROMPT_SENTINEL`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Remote port (default [`DEFAULT_SFTP_PORT`])
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl RoleSpec {
    /// A role using the local disk.
    #[must_use]
    pub fn local() -> Self {
        Self {
            kind: Some("local".to_owned()),
            ..Self::default()
        }
    }

    /// A role using an SFTP server.
    #[must_use]
    pub fn sftp(
        address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            kind: Some("sftp".to_owned()),
            address: Some(address.into()),
            username: Some(username.into()),
            password: Some(password.into()),
            port: None,
        }
    }

    /// Set the remote port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Backend kind this role resolves to.
    #[must_use]
    pub fn backend_kind(&self) -> BackendKind {
        BackendKind::from_key(self.kind.as_deref())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRole {
    Key(String),
    Block(RoleBlock),
}

#[derive(Deserialize)]
struct RoleBlock {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default, alias = "user")]
    username: Option<String>,
    #[serde(default, alias = "pass")]
    password: Option<String>,
    #[serde(default)]
    port: Option<u16>,
}

impl From<RawRole> for RoleSpec {
    fn from(raw: RawRole) -> Self {
        match raw {
            RawRole::Key(kind) => Self {
                kind: Some(kind),
                ..Self::default()
            },
            RawRole::Block(block) => Self {
                kind: block.kind,
                address: block.address,
                username: block.username,
                password: block.password,
                port: block.port,
            },
        }
    }
}

/// A `(from, to)` mapping of a file or folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPair {
    /// Path on the source backend
    pub from: String,
    /// Path on the destination backend
    pub to: String,
}

impl PathPair {
    /// Create a new mapping.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Job-level SFTP parameters, used by remote roles that leave them out.
///
/// Lets a job written as `"from": "sftp"` keep its connection details at the
/// top level of the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SftpDefaults {
    /// Remote host name or IP
    #[serde(rename = "sftp_addr", default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Login name, or [`PROMPT_SENTINEL`]
    #[serde(rename = "sftp_user", default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Password, or [`PROMPT_SENTINEL`]
    #[serde(rename = "sftp_pass", default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// One backup run's source, destination, and file/folder mappings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Source role
    #[serde(default)]
    pub from: RoleSpec,
    /// Destination role
    #[serde(default)]
    pub to: RoleSpec,
    /// Explicit file mappings, copied first and in order
    #[serde(default)]
    pub files: Vec<PathPair>,
    /// Folder mappings, discovered by recursive listing
    #[serde(default)]
    pub folders: Vec<PathPair>,
    /// Maximum chunk size in bytes
    pub maxbytes: usize,
    /// Top-level `sftp_addr` / `sftp_user` / `sftp_pass`
    #[serde(flatten)]
    pub sftp_defaults: SftpDefaults,
}

impl JobSpec {
    /// Parse and validate a job from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the document is malformed or `maxbytes`
    /// is zero.
    pub fn from_json(text: &str) -> Result<Self> {
        let spec: Self = serde_json::from_str(text).map_err(|e| Error::config(e.to_string()))?;
        spec.validate()?;
        Ok(spec)
    }

    /// Load and validate a job file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JobFile`] if the file cannot be read or parsed and
    /// [`Error::Config`] if it fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::JobFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let spec: Self = serde_json::from_str(&text).map_err(|e| Error::JobFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        spec.validate()?;
        Ok(spec)
    }

    /// Check the fields serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.maxbytes == 0 {
            return Err(Error::config("maxbytes must be a positive integer"));
        }
        for pair in self.files.iter().chain(&self.folders) {
            if pair.from.is_empty() || pair.to.is_empty() {
                return Err(Error::config(format!(
                    "empty path in mapping {:?} -> {:?}",
                    pair.from, pair.to
                )));
            }
        }
        Ok(())
    }

    /// Role block for `role`.
    #[must_use]
    pub fn role(&self, role: Role) -> &RoleSpec {
        match role {
            Role::From => &self.from,
            Role::To => &self.to,
        }
    }

    /// Role block for `role` with missing SFTP fields taken from the
    /// job-level defaults.
    #[must_use]
    pub fn effective_role(&self, role: Role) -> RoleSpec {
        let mut spec = self.role(role).clone();
        let defaults = &self.sftp_defaults;
        if spec.address.is_none() {
            spec.address.clone_from(&defaults.address);
        }
        if spec.username.is_none() {
            spec.username.clone_from(&defaults.username);
        }
        if spec.password.is_none() {
            spec.password.clone_from(&defaults.password);
        }
        spec
    }
}
