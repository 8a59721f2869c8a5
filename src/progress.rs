//! Progress reporting support (requires `progress` feature)

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner showing the file currently being copied.
///
/// The number of files in a folder is only known once it has been listed on
/// the source, so a spinner with a message is used instead of a bar.
#[must_use]
pub fn create_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} files {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Advance `pb` by one copied file and show its destination.
pub fn record_file(pb: &ProgressBar, to: &str) {
    pb.inc(1);
    pb.set_message(to.to_owned());
}
