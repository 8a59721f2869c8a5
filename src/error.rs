//! Error types for ferry.
//!
//! This module provides the [`Error`] enum containing all possible errors
//! that can occur while resolving backends and copying data, and the
//! [`Result`] type alias.
//!
//! # Error Categories
//!
//! | Category | Errors |
//! |----------|--------|
//! | Configuration | [`Error::Config`], [`Error::JobFile`], [`Error::Prompt`] |
//! | Connection | [`Error::Connection`] |
//! | Source | [`Error::NotFound`] |
//! | Capability | [`Error::Unsupported`] |
//! | IO | [`Error::Io`] |
//!
//! Every error is fatal for the job that raised it. Nothing in the crate
//! retries; backends that were already opened are still closed by their
//! scope guard while the error propagates.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for ferry operations.
///
/// This is a type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during a backup run.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A required job field is missing or malformed
    #[error("Invalid job configuration: {message}")]
    Config {
        /// What was wrong with the configuration
        message: String,
    },

    /// The job file could not be read or parsed
    #[error("Failed to load job file {path}: {message}")]
    JobFile {
        /// Location of the job file
        path: PathBuf,
        /// Read or parse failure
        message: String,
    },

    /// Interactive credential entry failed
    #[error("Failed to read credentials: {0}")]
    Prompt(String),

    /// The remote session could not be established or was lost
    #[error("Connection to {address} failed: {message}")]
    Connection {
        /// `host:port` of the remote server
        address: String,
        /// Underlying failure
        message: String,
    },

    /// Source path does not exist
    #[error("Source path does not exist: {0}")]
    NotFound(String),

    /// The backend variant does not implement the requested capability
    #[error("{backend} backend does not support {operation}")]
    Unsupported {
        /// Backend type key
        backend: &'static str,
        /// Capability that was invoked
        operation: &'static str,
    },

    /// IO error on a backend path
    #[error("IO error on {path}: {source}")]
    Io {
        /// Path the operation was acting on
        path: String,
        /// Underlying error
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wrap an IO error for `path`, promoting `NotFound` to [`Error::NotFound`].
    pub(crate) fn io(path: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound(path.to_owned())
        } else {
            Self::Io {
                path: path.to_owned(),
                source,
            }
        }
    }

    /// Wrap a write-side IO error for `path`.
    ///
    /// Unlike [`Error::io`], a missing path here is not a missing source.
    pub(crate) fn write(path: &str, source: io::Error) -> Self {
        Self::Io {
            path: path.to_owned(),
            source,
        }
    }

    /// Short machine-readable category, used by the CLI in error output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } | Self::JobFile { .. } | Self::Prompt(_) => "configuration",
            Self::Connection { .. } => "connection",
            Self::NotFound(_) => "not_found",
            Self::Unsupported { .. } => "unsupported",
            Self::Io { .. } => "io",
        }
    }
}
