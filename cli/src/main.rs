//! ferry - chunked backups
//!
//! Runs one or more JSON job files, copying files and folders between the
//! local disk and SFTP servers.

use clap::Parser;
use dialoguer::{Input, Password};
use ferry::{CopyStats, CredentialPrompt, Error as FerryError, JobEvent, Runner, SessionRegistry};
use indicatif::ProgressBar;
use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// ferry - chunked backups between local disks and SFTP servers
///
/// Each JOB file names a source, a destination, the files and folders to
/// copy, and the chunk size. Jobs run one after another; the first failure
/// stops the run.
///
/// Usage:
///   ferry                     (runs ./config.json)
///   ferry daily.json weekly.json
#[derive(Parser, Debug)]
#[command(name = "ferry", version, about, long_about = None)]
struct Args {
    /// Job file(s) to run, in order
    #[arg(value_name = "JOB", default_value = "config.json")]
    job_files: Vec<PathBuf>,

    /// Disable the progress spinner
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Verbose output (per-file log lines; RUST_LOG overrides)
    #[arg(short = 'v', long)]
    verbose: bool,
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error("Backup {index} of {total} failed ({}): {source}", .path.display())]
    Job {
        index: usize,
        total: usize,
        path: PathBuf,
        source: FerryError,
    },
}

impl CliError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Job { source, .. } => source.kind(),
        }
    }
}

/// Asks for credentials on the terminal.
struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    fn username(&self, endpoint: &str) -> ferry::Result<String> {
        Input::<String>::new()
            .with_prompt(format!("Username for {endpoint}"))
            .interact_text()
            .map(|name| name.trim().to_owned())
            .map_err(|e| FerryError::Prompt(format!("username for {endpoint}: {e}")))
    }

    fn password(&self, username: &str, endpoint: &str) -> ferry::Result<String> {
        Password::new()
            .with_prompt(format!("Password for {username}@{endpoint}"))
            .interact()
            .map_err(|e| FerryError::Prompt(format!("password for {username}@{endpoint}: {e}")))
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(error) = run(&args) {
        eprintln!("error[{}]: {}", error.kind(), error);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ferry={default_level}")));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();
}

fn run(args: &Args) -> CliResult<()> {
    let mut runner = Runner::with_parts(SessionRegistry::default(), Box::new(TerminalPrompt));
    let total = args.job_files.len();
    tracing::debug!(jobs = total, "starting run");

    let mut current = 0;
    let mut spinner: Option<ProgressBar> = None;

    let result = runner.run_all(&args.job_files, |event| match event {
        JobEvent::Started { index, total, path } => {
            current = index;
            println!("Initiating backup {index} of {total}: {}", path.display());
        }
        JobEvent::FileCopied { from, to, bytes } => {
            // Created lazily so credential prompts are not drawn over.
            if spinner.is_none() && !args.quiet {
                spinner = Some(ferry::create_spinner());
            }
            if let Some(pb) = &spinner {
                ferry::record_file(pb, to);
            }
            if args.verbose {
                let line = format!("  {from} -> {to} ({})", format_bytes(bytes));
                match &spinner {
                    Some(pb) => pb.println(line),
                    None => println!("{line}"),
                }
            }
        }
        JobEvent::Finished { index, total, stats } => {
            if let Some(pb) = spinner.take() {
                pb.finish_and_clear();
            }
            println!("Backup {index} of {total} complete: {}", summarize(stats));
        }
    });

    if let Some(pb) = spinner.take() {
        pb.finish_and_clear();
    }

    let results = result.map_err(|source| CliError::Job {
        index: current,
        total,
        path: args
            .job_files
            .get(current.saturating_sub(1))
            .cloned()
            .unwrap_or_default(),
        source,
    })?;

    if results.len() > 1 {
        let mut overall = CopyStats::default();
        for stats in &results {
            overall.files_copied += stats.files_copied;
            overall.bytes_copied += stats.bytes_copied;
            overall.duration += stats.duration;
        }
        println!("All {} backups complete: {}", results.len(), summarize(&overall));
    }
    Ok(())
}

fn summarize(stats: &CopyStats) -> String {
    let files = if stats.files_copied == 1 { "file" } else { "files" };
    format!(
        "{} {files} ({}) in {:.2?}",
        stats.files_copied,
        format_bytes(stats.bytes_copied),
        stats.duration
    )
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
