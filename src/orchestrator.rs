//! Job orchestration: resolve both backends, copy explicit files, then
//! folders; run several job files in sequence.

use crate::copy::{CopyStats, copy_file, copy_folder};
use crate::error::Result;
use crate::factory::{CredentialPrompt, NoPrompt, resolve};
use crate::job::{JobSpec, Role};
use crate::registry::SessionRegistry;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Progress notifications emitted while running jobs.
#[derive(Debug, Clone, Copy)]
pub enum JobEvent<'a> {
    /// A job file is about to run (`index` is 1-based).
    Started {
        /// Position in the run
        index: usize,
        /// Number of job files in the run
        total: usize,
        /// Job file location
        path: &'a Path,
    },
    /// One file finished copying.
    FileCopied {
        /// Source path
        from: &'a str,
        /// Destination path
        to: &'a str,
        /// Bytes copied
        bytes: u64,
    },
    /// A job file completed.
    Finished {
        /// Position in the run
        index: usize,
        /// Number of job files in the run
        total: usize,
        /// What the job copied
        stats: &'a CopyStats,
    },
}

/// Run one job: explicit file pairs first, in order, then folder pairs.
///
/// Source and destination are resolved once and opened for the whole job;
/// both are closed again whether the job succeeds or fails. `on_file` is
/// called after every copied file with `(from, to, bytes)`.
///
/// # Errors
///
/// Returns the first error encountered. Nothing is retried and files copied
/// before the failure are left in place.
pub fn run_job<F>(
    spec: &JobSpec,
    registry: &mut SessionRegistry,
    prompt: &dyn CredentialPrompt,
    mut on_file: F,
) -> Result<CopyStats>
where
    F: FnMut(&str, &str, u64),
{
    spec.validate()?;
    let start_time = Instant::now();

    let src = resolve(Role::From, spec, registry, prompt)?;
    let dst = resolve(Role::To, spec, registry, prompt)?;

    let src = src.enter()?;
    let mut dst = dst.enter()?;
    let chunk_size = spec.maxbytes;
    let mut stats = CopyStats::default();

    for pair in &spec.files {
        let bytes = copy_file(&*src, &pair.from, &mut *dst, &pair.to, chunk_size)?;
        stats.add_file(bytes);
        on_file(&pair.from, &pair.to, bytes);
    }

    for pair in &spec.folders {
        let folder = copy_folder(&*src, &pair.from, &mut *dst, &pair.to, chunk_size, &mut on_file)?;
        stats.merge(&folder);
    }

    // Destination first: its pending writes must be flushed while a
    // connection shared with the source is still up.
    dst.exit()?;
    src.exit()?;

    stats.duration = start_time.elapsed();
    tracing::info!(
        files = stats.files_copied,
        bytes = stats.bytes_copied,
        "job complete"
    );
    Ok(stats)
}

/// Runs job files one after another with a run-scoped session registry.
///
/// # Example
///
/// ```no_run
/// use ferry::{JobEvent, Runner};
/// use std::path::PathBuf;
///
/// let mut runner = Runner::new();
/// runner.run_all(&[PathBuf::from("config.json")], |event| {
///     if let JobEvent::Finished { index, total, stats } = event {
///         println!("{index}/{total}: {} files", stats.files_copied);
///     }
/// })?;
/// # Ok::<(), ferry::Error>(())
/// ```
pub struct Runner {
    registry: SessionRegistry,
    prompt: Box<dyn CredentialPrompt>,
}

impl Runner {
    /// Runner with the default connector and no interactive prompt.
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(SessionRegistry::default(), Box::new(NoPrompt))
    }

    /// Runner with an explicit registry and credential prompt.
    #[must_use]
    pub fn with_parts(registry: SessionRegistry, prompt: Box<dyn CredentialPrompt>) -> Self {
        Self { registry, prompt }
    }

    /// Replace the credential prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl CredentialPrompt + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    /// Run an already loaded job.
    ///
    /// # Errors
    ///
    /// See [`run_job`].
    pub fn run_spec<F>(&mut self, spec: &JobSpec, on_file: F) -> Result<CopyStats>
    where
        F: FnMut(&str, &str, u64),
    {
        run_job(spec, &mut self.registry, self.prompt.as_ref(), on_file)
    }

    /// Load and run each job file in order.
    ///
    /// # Errors
    ///
    /// The first failing job aborts the run; later job files are not loaded.
    pub fn run_all<F>(&mut self, paths: &[PathBuf], mut on_event: F) -> Result<Vec<CopyStats>>
    where
        F: FnMut(JobEvent<'_>),
    {
        let total = paths.len();
        let mut results = Vec::with_capacity(total);

        for (i, path) in paths.iter().enumerate() {
            let index = i + 1;
            on_event(JobEvent::Started { index, total, path });
            let _span = tracing::info_span!("job", index, path = %path.display()).entered();

            let spec = JobSpec::load(path)?;
            let stats = self.run_spec(&spec, |from, to, bytes| {
                on_event(JobEvent::FileCopied { from, to, bytes });
            })?;

            on_event(JobEvent::Finished {
                index,
                total,
                stats: &stats,
            });
            results.push(stats);
        }
        Ok(results)
    }

    /// The run's session registry.
    #[must_use]
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
