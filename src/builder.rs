//! Builder API for assembling a job in code.
//!
//! Job files are the usual way to describe a backup, but the same job can be
//! put together fluently and run directly.
//!
//! # Examples
//!
//! ## Local Mirror
//!
//! ```no_run
//! use ferry::JobBuilder;
//!
//! let stats = JobBuilder::new()
//!     .file("notes.txt", "/mnt/backup/notes.txt")
//!     .folder("photos", "/mnt/backup/photos")
//!     .max_bytes(1 << 20)
//!     .run()?;
//! println!("Copied {} files", stats.files_copied);
//! # Ok::<(), ferry::Error>(())
//! ```
//!
//! ## Upload to a Server
//!
//! ```no_run
//! use ferry::{JobBuilder, RoleSpec};
//!
//! let job = JobBuilder::new()
//!     .to(RoleSpec::sftp("backup.example", "alice", "secret").with_port(2222))
//!     .folder("projects", "/srv/backup/projects")
//!     .build()?;
//! assert_eq!(job.folders.len(), 1);
//! # Ok::<(), ferry::Error>(())
//! ```

use crate::copy::CopyStats;
use crate::error::Result;
use crate::factory::{CredentialPrompt, NoPrompt};
use crate::job::{JobSpec, PathPair, RoleSpec, SftpDefaults};
use crate::orchestrator::run_job;
use crate::registry::SessionRegistry;

/// Chunk size used when none is set: 64 KiB.
pub const DEFAULT_MAX_BYTES: usize = 64 * 1024;

/// A builder for configuring and running one job.
///
/// Both roles default to the local disk.
#[derive(Debug, Clone)]
pub struct JobBuilder {
    spec: JobSpec,
}

impl JobBuilder {
    /// Create a local-to-local job with no mappings and a 64 KiB chunk size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            spec: JobSpec {
                from: RoleSpec::local(),
                to: RoleSpec::local(),
                files: Vec::new(),
                folders: Vec::new(),
                maxbytes: DEFAULT_MAX_BYTES,
                sftp_defaults: SftpDefaults::default(),
            },
        }
    }

    /// Set the source backend.
    #[must_use]
    pub fn from(mut self, role: RoleSpec) -> Self {
        self.spec.from = role;
        self
    }

    /// Set the destination backend.
    #[must_use]
    pub fn to(mut self, role: RoleSpec) -> Self {
        self.spec.to = role;
        self
    }

    /// Add an explicit file mapping. Files are copied in the order added,
    /// before any folder.
    #[must_use]
    pub fn file(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.spec.files.push(PathPair::new(from, to));
        self
    }

    /// Add a folder mapping.
    #[must_use]
    pub fn folder(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.spec.folders.push(PathPair::new(from, to));
        self
    }

    /// Set the chunk size in bytes.
    ///
    /// Small values trade throughput for a smaller memory footprint; zero is
    /// rejected by [`build`](Self::build).
    #[must_use]
    pub fn max_bytes(mut self, max_bytes: usize) -> Self {
        self.spec.maxbytes = max_bytes;
        self
    }

    /// Validate and return the job.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the chunk size is
    /// zero or a mapping has an empty path.
    pub fn build(self) -> Result<JobSpec> {
        self.spec.validate()?;
        Ok(self.spec)
    }

    /// Run the job without interactive credential entry.
    ///
    /// # Errors
    ///
    /// See [`run_job`](crate::run_job).
    pub fn run(self) -> Result<CopyStats> {
        self.run_with(&NoPrompt)
    }

    /// Run the job, asking `prompt` for credentials set to `"prompt"`.
    ///
    /// # Errors
    ///
    /// See [`run_job`](crate::run_job).
    pub fn run_with(self, prompt: &dyn CredentialPrompt) -> Result<CopyStats> {
        let spec = self.build()?;
        let mut registry = SessionRegistry::default();
        run_job(&spec, &mut registry, prompt, |_, _, _| {})
    }
}

impl Default for JobBuilder {
    fn default() -> Self {
        Self::new()
    }
}
