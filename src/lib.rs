//! # ferry
//!
//! Chunked, bounded-memory backup copies between local disks and SFTP servers.
//!
//! ## Core Features
//!
//! - **Bounded memory**: Files are streamed in chunks of at most `maxbytes`
//!   bytes; the first chunk truncates the destination, later chunks append
//! - **Pluggable storage**: Local disk, SFTP, and a cloud placeholder behind
//!   one [`Storage`](backend::Storage) capability
//! - **Scoped resources**: Backends are opened for a whole job and closed on
//!   every exit path, including errors
//! - **Connection reuse**: Roles pointing at the same server, user, and port
//!   share one session per run
//! - **Interactive credentials**: A username or password of `"prompt"` is
//!   asked for at run time
//!
//! ## Quick Start with Builder API
//!
//! ```no_run
//! use ferry::JobBuilder;
//!
//! let stats = JobBuilder::new()
//!     .folder("documents", "/mnt/usb/documents")
//!     .run()?;
//! println!("Copied {} files ({} bytes)", stats.files_copied, stats.bytes_copied);
//! # Ok::<(), ferry::Error>(())
//! ```
//!
//! ## Job Files
//!
//! ```no_run
//! use ferry::{JobEvent, Runner};
//! use std::path::PathBuf;
//!
//! let jobs = [PathBuf::from("daily.json"), PathBuf::from("weekly.json")];
//! let results = Runner::new().run_all(&jobs, |event| {
//!     if let JobEvent::Started { index, total, path } = event {
//!         println!("Initiating backup {index} of {total}: {}", path.display());
//!     }
//! })?;
//! # Ok::<(), ferry::Error>(())
//! ```
//!
//! ## Function API
//!
//! ```no_run
//! use ferry::backend::{Backend, LocalBackend};
//! use ferry::copy_file;
//!
//! let src = Backend::Local(LocalBackend::new()).enter()?;
//! let mut dst = Backend::Local(LocalBackend::new()).enter()?;
//! let bytes = copy_file(&*src, "big.iso", &mut *dst, "/mnt/usb/big.iso", 4 << 20)?;
//! dst.exit()?;
//! # Ok::<(), ferry::Error>(())
//! ```
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `sftp` | SFTP connector backed by `ssh2` (default) |
//! | `progress` | Spinner helpers with indicatif |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod backend;
mod builder;
mod copy;
mod error;
mod factory;
mod job;
mod orchestrator;
mod registry;
mod stream;
mod utils;

#[cfg(feature = "progress")]
mod progress;

pub use builder::{DEFAULT_MAX_BYTES, JobBuilder};
pub use copy::{CopyStats, copy_file, copy_folder};
pub use error::{Error, Result};
pub use factory::{CredentialPrompt, NoPrompt, resolve};
pub use job::{
    BackendKind, DEFAULT_SFTP_PORT, JobSpec, PROMPT_SENTINEL, PathPair, Role, RoleSpec,
    SftpDefaults,
};
pub use orchestrator::{JobEvent, Runner, run_job};
pub use registry::{SessionKey, SessionRegistry, UnavailableConnector};
pub use stream::ChunkStream;

#[cfg(feature = "progress")]
#[cfg_attr(docsrs, doc(cfg(feature = "progress")))]
pub use progress::{create_spinner, record_file};
