//! User-facing status output for the snapdiff CLI.
//!
//! Diagnostics go through `tracing`; progress lines are drawn only when
//! stderr is a terminal.

mod progress;

pub use progress::Progress;

/// Starts a new progress line for tracking long operations.
#[must_use]
pub fn start_progress(title: &str, total: usize) -> Progress {
    Progress::new(title, total)
}
