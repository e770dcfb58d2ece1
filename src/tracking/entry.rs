use crate::error::FileAccessError;
use crate::freshness::Snapshot;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Lifecycle state of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileStatus {
    /// Never registered, or removed. Never stored in the registry.
    NotRead,
    /// The snapshot matches the live file
    Current,
    /// The live file has diverged from the snapshot
    Stale,
    /// The last comparison or re-read failed
    Error,
}

impl FileStatus {
    /// Every variant, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::NotRead, Self::Current, Self::Stale, Self::Error];

    /// Lowercase name for display and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotRead => "not_read",
            Self::Current => "current",
            Self::Stale => "stale",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record for one tracked path.
///
/// Entries are immutable once shared: every transition builds a new
/// `TrackedFile` and swaps it into the registry, so readers never observe a
/// half-updated entry. `error` is `Some` exactly when `status` is
/// [`FileStatus::Error`], and `last_updated_at >= first_read_at`.
#[derive(Debug, Clone)]
pub struct TrackedFile {
    /// Absolute path, the registry key
    pub path: PathBuf,
    /// Latest installed observation
    pub snapshot: Arc<Snapshot>,
    /// Current lifecycle state
    pub status: FileStatus,
    /// When the path was (re)registered
    pub first_read_at: DateTime<Utc>,
    /// Last state change, never earlier than `first_read_at`
    pub last_updated_at: DateTime<Utc>,
    /// Failure behind the `error` state
    pub error: Option<FileAccessError>,
    /// Insertion order, used to break eviction ties
    pub(crate) seq: u64,
}

impl TrackedFile {
    pub(crate) fn current(path: PathBuf, snapshot: Arc<Snapshot>, now: DateTime<Utc>, seq: u64) -> Self {
        Self {
            path,
            snapshot,
            status: FileStatus::Current,
            first_read_at: now,
            last_updated_at: now,
            error: None,
            seq,
        }
    }

    /// Next version of this entry with `snapshot` installed.
    pub(crate) fn with_snapshot(&self, snapshot: Arc<Snapshot>, fresh: bool, now: DateTime<Utc>) -> Self {
        let status = if fresh {
            FileStatus::Current
        } else {
            FileStatus::Stale
        };

        Self {
            snapshot,
            status,
            error: None,
            last_updated_at: self.clamp(now),
            ..self.clone()
        }
    }

    /// Next version of this entry in the error state.
    pub(crate) fn with_error(&self, snapshot: Arc<Snapshot>, error: FileAccessError, now: DateTime<Utc>) -> Self {
        Self {
            snapshot,
            status: FileStatus::Error,
            error: Some(error),
            last_updated_at: self.clamp(now),
            ..self.clone()
        }
    }

    /// The wall clock may step backwards; keep `last_updated_at >= first_read_at`.
    fn clamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.max(self.first_read_at)
    }

    /// Eviction order: oldest first read, then earliest insertion.
    pub(crate) fn eviction_key(&self) -> (DateTime<Utc>, u64) {
        (self.first_read_at, self.seq)
    }
}

/// Entry count per [`FileStatus`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    /// Always zero; untracked paths are never stored
    pub not_read: usize,
    /// Entries in `current`
    pub current: usize,
    /// Entries in `stale`
    pub stale: usize,
    /// Entries in `error`
    pub error: usize,
}

impl StatusCounts {
    /// Counts one more entry in `status`.
    pub fn record(&mut self, status: FileStatus) {
        match status {
            FileStatus::NotRead => self.not_read += 1,
            FileStatus::Current => self.current += 1,
            FileStatus::Stale => self.stale += 1,
            FileStatus::Error => self.error += 1,
        }
    }

    /// Count for `status`.
    #[must_use]
    pub const fn get(&self, status: FileStatus) -> usize {
        match status {
            FileStatus::NotRead => self.not_read,
            FileStatus::Current => self.current,
            FileStatus::Stale => self.stale,
            FileStatus::Error => self.error,
        }
    }

    /// Sum over all statuses.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.not_read + self.current + self.stale + self.error
    }
}
