//! CLI output: one line per file, an optional progress bar and a summary.
//!
//! Successes and skips go to stdout (suppressed by `--quiet`); failures
//! always go to stderr.

use std::path::Path;

use dirgrab_core::{DownloadOutcome, FetchSummary, SkippedEntry};
use indicatif::{ProgressBar, ProgressStyle};

/// Prints per-file lines while driving a progress bar.
pub(crate) struct Reporter {
    bar: ProgressBar,
    quiet: bool,
}

impl Reporter {
    /// Creates a reporter for `total` downloads.
    ///
    /// The bar is hidden unless `show_progress` is set.
    pub(crate) fn new(total: usize, show_progress: bool, quiet: bool) -> Self {
        let bar = if show_progress {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(
                ProgressStyle::with_template("{spinner} [{pos}/{len}] {wide_msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        } else {
            ProgressBar::hidden()
        };
        Self { bar, quiet }
    }

    pub(crate) fn skipped(&self, skipped: &SkippedEntry) {
        if self.quiet {
            return;
        }
        let line = format_skipped(skipped);
        self.bar.suspend(|| println!("{line}"));
    }

    pub(crate) fn outcome(&self, outcome: &DownloadOutcome) {
        self.bar.inc(1);
        self.bar.set_message(outcome.entry.name.clone());
        let line = format_outcome(outcome);
        if outcome.is_success() {
            if !self.quiet {
                self.bar.suspend(|| println!("{line}"));
            }
        } else {
            self.bar.suspend(|| eprintln!("{line}"));
        }
    }

    pub(crate) fn finish(&self, summary: &FetchSummary, target_dir: &Path) {
        self.bar.finish_and_clear();
        if !self.quiet {
            println!("{}", format_summary(summary, target_dir));
        }
    }
}

/// Formats the line printed for one download outcome.
pub(crate) fn format_outcome(outcome: &DownloadOutcome) -> String {
    match &outcome.result {
        Ok(bytes) => format!(
            "Downloaded {} to {} ({bytes} bytes)",
            outcome.entry.name,
            outcome.local_path.display()
        ),
        Err(error) => format!("Failed {}: {error}", outcome.entry.name),
    }
}

/// Formats the line printed for one skipped listing element.
pub(crate) fn format_skipped(skipped: &SkippedEntry) -> String {
    format!(
        "Skipped {}: {}",
        skipped.name.as_deref().unwrap_or("<unnamed>"),
        skipped.reason
    )
}

/// Formats the closing summary line.
pub(crate) fn format_summary(summary: &FetchSummary, target_dir: &Path) -> String {
    format!(
        "{} downloaded, {} failed, {} skipped into {} ({} bytes)",
        summary.completed,
        summary.failed,
        summary.skipped,
        target_dir.display(),
        summary.bytes
    )
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use dirgrab_core::download::{EntryKind, SkipReason};
    use dirgrab_core::{DirectoryEntry, DownloadError};

    use super::*;

    fn outcome(result: Result<u64, DownloadError>) -> DownloadOutcome {
        DownloadOutcome {
            entry: DirectoryEntry {
                name: "a.png".to_string(),
                download_url: "https://raw.example.com/a.png".to_string(),
                kind: EntryKind::File,
                size: Some(3),
            },
            local_path: PathBuf::from("icons/a.png"),
            result,
        }
    }

    #[test]
    fn test_format_outcome_success() {
        let line = format_outcome(&outcome(Ok(3)));
        assert_eq!(line, format!("Downloaded a.png to {} (3 bytes)", PathBuf::from("icons/a.png").display()));
    }

    #[test]
    fn test_format_outcome_failure_includes_reason() {
        let line = format_outcome(&outcome(Err(DownloadError::http_status(
            "https://raw.example.com/a.png",
            404,
        ))));
        assert!(line.starts_with("Failed a.png: "), "got: {line}");
        assert!(line.contains("404"), "got: {line}");
    }

    #[test]
    fn test_format_skipped_directory() {
        let line = format_skipped(&SkippedEntry {
            name: Some("subdir".to_string()),
            reason: SkipReason::NoDownloadUrl(EntryKind::Dir),
        });
        assert_eq!(line, "Skipped subdir: directory (not recursed)");
    }

    #[test]
    fn test_format_skipped_unnamed() {
        let line = format_skipped(&SkippedEntry {
            name: None,
            reason: SkipReason::Malformed("missing field `name`".to_string()),
        });
        assert!(line.starts_with("Skipped <unnamed>: malformed entry"));
    }

    #[test]
    fn test_format_summary_counts() {
        let summary = FetchSummary {
            completed: 2,
            failed: 1,
            skipped: 1,
            bytes: 42,
        };
        let line = format_summary(&summary, Path::new("icons"));
        assert_eq!(line, "2 downloaded, 1 failed, 1 skipped into icons (42 bytes)");
    }
}
