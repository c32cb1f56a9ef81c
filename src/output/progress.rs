//! In-place progress line for sync and compare.

use colored::Colorize;
use std::io::{self, IsTerminal, Write};

/// Git-style progress line on stderr: "Snapshotting: 40% (4/10)".
///
/// Silent unless stderr is a terminal.
pub struct Progress {
    title: String,
    total: usize,
    current: usize,
    enabled: bool,
    last_percent: Option<u8>,
}

impl Progress {
    #[must_use]
    pub fn new(title: &str, total: usize) -> Self {
        Self::with_display(title, total, io::stderr().is_terminal())
    }

    fn with_display(title: &str, total: usize, enabled: bool) -> Self {
        Self {
            title: title.to_string(),
            total,
            current: 0,
            enabled: enabled && total > 0,
            last_percent: None,
        }
    }

    /// Move to `current` processed items; redraws only when the percentage changes.
    pub fn update(&mut self, current: usize) {
        self.current = current.min(self.total);

        let percent = percent_of(self.current, self.total);
        if self.last_percent != Some(percent) {
            self.last_percent = Some(percent);
            if self.enabled {
                eprint!(
                    "\r{}: {}% ({}/{})",
                    self.title.dimmed(),
                    percent.to_string().dimmed(),
                    self.current,
                    self.total
                );
                let _ = io::stderr().flush();
            }
        }
    }

    /// Complete the line with ", done."
    pub fn finish(mut self) {
        if self.enabled {
            eprintln!(
                "\r{}: 100% ({}/{}), done.",
                self.title.dimmed(),
                self.total,
                self.total
            );
        }
        self.enabled = false;
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        // Abandoned mid-way: end the partial line
        if self.enabled && self.last_percent.is_some() {
            eprintln!();
        }
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn percent_of(current: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((current as f64 / total as f64) * 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(0, 10), 0);
        assert_eq!(percent_of(1, 4), 25);
        assert_eq!(percent_of(10, 10), 100);
        assert_eq!(percent_of(5, 0), 0);
    }

    #[test]
    fn test_update_clamps_to_total() {
        let mut progress = Progress::with_display("Test", 10, false);
        progress.update(20);
        assert_eq!(progress.current, 10);
        assert_eq!(progress.last_percent, Some(100));
    }

    #[test]
    fn test_zero_total_never_displays() {
        let progress = Progress::with_display("Test", 0, true);
        assert!(!progress.enabled);
    }
}
