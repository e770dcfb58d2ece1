//! Read-only reporting over a [`FileTracker`].
//!
//! [`FileStateQuery`] keeps no state of its own; every call is a projection of
//! the registry at that moment.

use crate::config::DiffConfig;
use crate::diff::{UnifiedDiffConfig, generate_binary_diff_message, generate_unified_diff, is_binary};
use crate::error::{FileAccessError, Result, TrackerError};
use crate::tracking::{FileStatus, FileTracker, StatusCounts, TrackedFile, normalize};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;

/// Aggregate view of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingSummary {
    /// Entries per status
    pub counts: StatusCounts,
    /// Number of tracked files
    pub tracked: usize,
    /// Configured `max_tracked_files`
    pub capacity: usize,
    /// Earliest `first_read_at` among tracked files
    pub oldest_first_read: Option<DateTime<Utc>>,
    /// Latest `last_updated_at` among tracked files
    pub latest_update: Option<DateTime<Utc>>,
}

/// Convenience filters and summaries on top of a tracker.
#[derive(Debug, Clone, Copy)]
pub struct FileStateQuery<'a> {
    tracker: &'a FileTracker,
    diff: &'a DiffConfig,
}

impl<'a> FileStateQuery<'a> {
    /// Query view over `tracker`, rendering diffs per `diff`.
    #[must_use]
    pub const fn new(tracker: &'a FileTracker, diff: &'a DiffConfig) -> Self {
        Self { tracker, diff }
    }

    /// Whether `path` is tracked.
    #[must_use]
    pub fn is_tracked(&self, path: impl AsRef<Path>) -> bool {
        self.tracker.contains(path)
    }

    /// Status of `path`, [`FileStatus::NotRead`] when untracked.
    #[must_use]
    pub fn status(&self, path: impl AsRef<Path>) -> FileStatus {
        self.tracker
            .get_file_status(path)
            .map_or(FileStatus::NotRead, |entry| entry.status)
    }

    /// Current entries, sorted by path.
    #[must_use]
    pub fn current_files(&self) -> Vec<Arc<TrackedFile>> {
        self.by_status_sorted(FileStatus::Current)
    }

    /// Stale entries, sorted by path.
    #[must_use]
    pub fn stale_files(&self) -> Vec<Arc<TrackedFile>> {
        self.by_status_sorted(FileStatus::Stale)
    }

    /// Entries in the error state, sorted by path.
    #[must_use]
    pub fn error_files(&self) -> Vec<Arc<TrackedFile>> {
        self.by_status_sorted(FileStatus::Error)
    }

    /// Files first read at or after `since`, oldest first.
    #[must_use]
    pub fn read_since(&self, since: DateTime<Utc>) -> Vec<Arc<TrackedFile>> {
        let mut files: Vec<_> = self
            .tracker
            .entries()
            .into_iter()
            .filter(|entry| entry.first_read_at >= since)
            .collect();
        files.sort_by(|a, b| a.first_read_at.cmp(&b.first_read_at).then_with(|| a.path.cmp(&b.path)));
        files
    }

    /// Counts and time bounds over every entry.
    #[must_use]
    pub fn summary(&self) -> TrackingSummary {
        let entries = self.tracker.entries();

        let mut counts = StatusCounts::default();
        for entry in &entries {
            counts.record(entry.status);
        }

        TrackingSummary {
            counts,
            tracked: entries.len(),
            capacity: self.tracker.capacity(),
            oldest_first_read: entries.iter().map(|e| e.first_read_at).min(),
            latest_update: entries.iter().map(|e| e.last_updated_at).max(),
        }
    }

    /// Unified diff between the stored snapshot of `path` and the live file.
    ///
    /// Returns `None` when diff generation is disabled, when the snapshot only
    /// kept a digest, or when the content is unchanged.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::NotTracked`] if the path is not tracked
    /// - [`TrackerError::FileAccess`] if the live file cannot be read
    pub fn diff(&self, path: impl AsRef<Path>, colorize: bool) -> Result<Option<String>> {
        if !self.diff.generate_diffs {
            return Ok(None);
        }

        let path = normalize(path.as_ref());
        let entry = self
            .tracker
            .get_file_status(&path)
            .ok_or(TrackerError::NotTracked(path))?;

        let Some(old) = entry.snapshot.content().as_bytes() else {
            return Ok(None);
        };

        let new = self
            .tracker
            .evaluator()
            .file_system()
            .read_all(&entry.path)?;
        if old == new.as_slice() {
            return Ok(None);
        }

        let old_label = format!("snapshot:{}", entry.path.display());
        let new_label = format!("live:{}", entry.path.display());
        let mut output = Vec::new();

        let written = if is_binary(old) || is_binary(&new) {
            generate_binary_diff_message(&old_label, &new_label, &mut output)
        } else {
            let config = UnifiedDiffConfig {
                context_lines: self.diff.context_lines,
                colorize,
                ..UnifiedDiffConfig::default()
            };
            generate_unified_diff(
                &String::from_utf8_lossy(old),
                &String::from_utf8_lossy(&new),
                &old_label,
                &new_label,
                &config,
                &mut output,
            )
            .map(|_| ())
        };
        written.map_err(|e| FileAccessError::from_io(&entry.path, &e))?;

        Ok(Some(String::from_utf8_lossy(&output).into_owned()))
    }

    fn by_status_sorted(&self, status: FileStatus) -> Vec<Arc<TrackedFile>> {
        let mut files = self.tracker.get_by_status(status);
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackingConfig;
    use crate::fs::OsFileSystem;
    use tempfile::tempdir;

    fn tracker() -> FileTracker {
        FileTracker::new(Arc::new(OsFileSystem::default()), &TrackingConfig::default()).unwrap()
    }

    #[test]
    fn test_status_of_untracked_is_not_read() {
        let tracker = tracker();
        let diff = DiffConfig::default();
        let query = FileStateQuery::new(&tracker, &diff);

        assert_eq!(query.status("/nowhere/at/all"), FileStatus::NotRead);
        assert!(!query.is_tracked("/nowhere/at/all"));
    }

    #[test]
    fn test_summary_and_filters() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "alpha")?;
        std::fs::write(&b, "beta")?;

        let tracker = tracker();
        let diff = DiffConfig::default();
        let query = FileStateQuery::new(&tracker, &diff);

        tracker.capture_and_register(&a)?;
        tracker.capture_and_register(&b)?;
        std::fs::remove_file(&b)?;
        tracker.refresh(&b);

        let summary = query.summary();
        assert_eq!(summary.tracked, 2);
        assert_eq!(summary.capacity, 1000);
        assert_eq!(summary.counts.current, 1);
        assert_eq!(summary.counts.error, 1);
        assert!(summary.oldest_first_read <= summary.latest_update);

        assert_eq!(query.current_files()[0].path, a);
        assert_eq!(query.error_files()[0].path, b);
        assert!(query.stale_files().is_empty());

        Ok(())
    }

    #[test]
    fn test_diff_of_modified_file() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "one\ntwo\nthree\n")?;

        let tracker = tracker();
        let diff = DiffConfig::default();
        let query = FileStateQuery::new(&tracker, &diff);
        tracker.capture_and_register(&path)?;

        assert_eq!(query.diff(&path, false)?, None);

        std::fs::write(&path, "one\n2\nthree\n")?;
        let rendered = query.diff(&path, false)?.expect("diff expected");
        assert!(rendered.contains("-two"));
        assert!(rendered.contains("+2"));
        assert!(rendered.contains("live:"));

        Ok(())
    }

    #[test]
    fn test_diff_disabled_or_untracked() -> anyhow::Result<()> {
        let tracker = tracker();
        let disabled = DiffConfig {
            generate_diffs: false,
            ..DiffConfig::default()
        };
        assert_eq!(FileStateQuery::new(&tracker, &disabled).diff("/x", false)?, None);

        let enabled = DiffConfig::default();
        let err = FileStateQuery::new(&tracker, &enabled)
            .diff("/x", false)
            .unwrap_err();
        assert!(matches!(err, TrackerError::NotTracked(_)));

        Ok(())
    }

    #[test]
    fn test_diff_untracked_names_absolute_path() -> anyhow::Result<()> {
        let tracker = tracker();
        let diff = DiffConfig::default();
        let query = FileStateQuery::new(&tracker, &diff);

        let from_query = query.diff("relative/notes.txt", false).unwrap_err();
        let snapshot = crate::Snapshot::from_bytes(b"x".to_vec(), std::time::UNIX_EPOCH);
        let from_tracker = tracker
            .update_state("relative/notes.txt", snapshot)
            .unwrap_err();

        let expected = std::env::current_dir()?.join("relative/notes.txt");
        assert!(matches!(from_query, TrackerError::NotTracked(ref p) if *p == expected));
        assert_eq!(from_query.to_string(), from_tracker.to_string());

        Ok(())
    }

    #[test]
    fn test_binary_diff() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("blob.bin");
        std::fs::write(&path, [0u8, 1, 2, 3])?;

        let tracker = tracker();
        let diff = DiffConfig::default();
        tracker.capture_and_register(&path)?;
        std::fs::write(&path, [0u8, 9, 9, 9])?;

        let rendered = FileStateQuery::new(&tracker, &diff)
            .diff(&path, false)?
            .expect("diff expected");
        assert!(rendered.starts_with("Binary files"));

        Ok(())
    }
}
