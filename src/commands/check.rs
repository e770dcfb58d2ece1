use super::{CliContext, expand_paths};
use crate::output;
use crate::query::FileStateQuery;
use crate::tracking::{FileStatus, FileTracker, StatusCounts};
use anyhow::{Context, Result};
use chrono::Utc;
use std::path::PathBuf;
use std::time::Duration;

/// Options for the `check` command.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Pause between registration and the freshness check
    pub wait: Option<Duration>,
    /// Re-read every file after the check
    pub refresh: bool,
    /// Print diffs for stale files
    pub show_diffs: bool,
}

/// Registers `paths`, optionally waits, then reports which copies went stale.
///
/// # Errors
///
/// Returns an error if the tracker cannot be built from the configuration.
pub fn execute(ctx: &CliContext, paths: &[PathBuf], options: &CheckOptions) -> Result<()> {
    let tracker = FileTracker::from_config(&ctx.config).context("Invalid tracking configuration")?;
    let query = FileStateQuery::new(&tracker, &ctx.config.diff);

    let paths = expand_paths(paths);
    for path in &paths {
        if let Err(err) = tracker.capture_and_register(path) {
            output::warning(&err.to_string());
        }
    }

    if paths.len() > tracker.capacity() {
        output::info(&format!(
            "{} paths given, only the {} most recently read are tracked",
            paths.len(),
            tracker.capacity()
        ));
    }

    if let Some(wait) = options.wait {
        output::info(&format!("Waiting {}...", humantime::format_duration(wait)));
        std::thread::sleep(wait);
    }

    let mut entries = tracker.entries();
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    let now = Utc::now();
    // is_stale never touches the registry, so tally what this run observed
    let mut counts = StatusCounts::default();

    for entry in &entries {
        let status = if tracker.is_stale(&entry.path) {
            FileStatus::Stale
        } else {
            entry.status
        };
        counts.record(status);
        println!(
            "{} {} ({})",
            output::status_label(status),
            entry.path.display(),
            output::format_age(entry.first_read_at, now)
        );

        if options.show_diffs && status == FileStatus::Stale {
            match query.diff(&entry.path, true) {
                Ok(Some(diff)) => print!("{diff}"),
                Ok(None) => {}
                Err(err) => output::warning(&err.to_string()),
            }
        }
    }

    if options.refresh {
        counts = tracker.refresh_all();
        output::success(&format!(
            "Refreshed: {} current, {} error",
            counts.current, counts.error
        ));
    }

    let summary = query.summary();
    println!();
    println!(
        "{} tracked (capacity {}): {} current, {} stale, {} error",
        summary.tracked, summary.capacity, counts.current, counts.stale, counts.error
    );

    Ok(())
}
