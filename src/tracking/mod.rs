//! Bounded registry of observed files.
//!
//! [`FileTracker`] owns one [`TrackedFile`] per path and moves each through its
//! lifecycle (`current`, `stale`, `error`). It has no filesystem logic of its
//! own: every freshness question goes to the [`FreshnessEvaluator`].
//!
//! ## Locking
//!
//! The path → entry map sits behind a single `RwLock`. Operations on one path
//! are serialised by a per-path mutex held in a `DashMap`; filesystem I/O runs
//! under that mutex only, never under the map lock, so one slow file cannot
//! block lookups of unrelated paths. Installing the resulting entry is the only
//! step that takes the map's write lock. A path's mutex is dropped from the
//! lock table as soon as no operation holds it, so the table never outgrows
//! the set of paths currently being worked on.

mod entry;

pub use entry::{FileStatus, StatusCounts, TrackedFile};

use crate::config::{Config, TrackingConfig};
use crate::error::{FileAccessError, Result, TrackerError};
use crate::freshness::{FreshnessEvaluator, Snapshot};
use crate::fs::{FileSystem, OsFileSystem};
use chrono::Utc;
use dashmap::DashMap;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

type EntryMap = HashMap<PathBuf, Arc<TrackedFile>>;

/// In-process record of observed files and the freshness of their snapshots.
///
/// Construct one per session and hand it to whoever needs it; there is no
/// global instance.
pub struct FileTracker {
    evaluator: FreshnessEvaluator,
    max_tracked_files: usize,
    track_all_files: bool,
    entries: RwLock<EntryMap>,
    path_locks: DashMap<PathBuf, Arc<Mutex<()>>>,
    next_seq: AtomicU64,
}

impl std::fmt::Debug for FileTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileTracker")
            .field("evaluator", &self.evaluator)
            .field("max_tracked_files", &self.max_tracked_files)
            .field("track_all_files", &self.track_all_files)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl FileTracker {
    /// Creates a tracker reading through `fs`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidConfig`] if `max_tracked_files` is zero.
    pub fn new(fs: Arc<dyn FileSystem>, config: &TrackingConfig) -> Result<Self> {
        if config.max_tracked_files == 0 {
            return Err(TrackerError::InvalidConfig(
                "max_tracked_files must be at least 1".to_string(),
            ));
        }

        let evaluator = FreshnessEvaluator::new(fs, config.use_content_hash, config.hash_algorithm);

        Ok(Self {
            evaluator,
            max_tracked_files: config.max_tracked_files,
            track_all_files: config.track_all_files,
            entries: RwLock::new(HashMap::new()),
            path_locks: DashMap::new(),
            next_seq: AtomicU64::new(0),
        })
    }

    /// Creates a tracker on the real filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidConfig`] if the tracking section is unusable.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fs = OsFileSystem::new(config.performance.mmap_threshold);
        Self::new(Arc::new(fs), &config.tracking)
    }

    /// Evaluator every freshness question goes through.
    #[must_use]
    pub const fn evaluator(&self) -> &FreshnessEvaluator {
        &self.evaluator
    }

    /// Maximum number of tracked files.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.max_tracked_files
    }

    /// Whether [`auto_track`](Self::auto_track) registers anything.
    #[must_use]
    pub const fn tracks_all_files(&self) -> bool {
        self.track_all_files
    }

    /// Starts tracking `path` as current with a caller-supplied snapshot.
    ///
    /// Overwrites any existing entry and restarts its lifecycle. If the registry
    /// is then over capacity, exactly one other entry is evicted: the one with
    /// the oldest `first_read_at`, ties going to the earliest inserted. Returns
    /// the evicted path, if any.
    pub fn register(&self, path: impl AsRef<Path>, snapshot: Snapshot) -> Option<PathBuf> {
        let (_, evicted) = self.install_current(normalize(path.as_ref()), snapshot);
        evicted
    }

    /// Registers `path` only when blanket tracking is enabled.
    ///
    /// Returns whether the path was registered.
    pub fn auto_track(&self, path: impl AsRef<Path>, snapshot: Snapshot) -> bool {
        if !self.track_all_files {
            debug!(path = %path.as_ref().display(), "Auto-tracking disabled, ignoring");
            return false;
        }
        self.register(path, snapshot);
        true
    }

    /// Captures `path` through the evaluator and registers the result.
    ///
    /// # Errors
    ///
    /// Returns a [`FileAccessError`] if the file cannot be read; nothing is
    /// registered in that case.
    pub fn capture_and_register(
        &self,
        path: impl AsRef<Path>,
    ) -> std::result::Result<Arc<TrackedFile>, FileAccessError> {
        let path = normalize(path.as_ref());
        let snapshot = self.evaluator.capture(&path)?;
        let (entry, _) = self.install_current(path, snapshot);
        Ok(entry)
    }

    /// Installs a newer observation of a tracked file and re-derives its status.
    ///
    /// The new snapshot is stored whatever the outcome: `current` if it matches
    /// the live file, `stale` if not, `error` if the comparison failed.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotTracked`] if the path is not tracked, including
    /// when it was evicted or removed while the comparison was running.
    pub fn update_state(&self, path: impl AsRef<Path>, snapshot: Snapshot) -> Result<FileStatus> {
        let path = normalize(path.as_ref());
        let status = self.with_path_lock(&path, || {
            if !self.read_entries().contains_key(&path) {
                return Err(TrackerError::NotTracked(path.clone()));
            }

            let snapshot = Arc::new(snapshot);
            let outcome = self.evaluator.compare(&path, &snapshot);

            let mut entries = self.write_entries();
            let Some(existing) = entries.get(&path) else {
                return Err(TrackerError::NotTracked(path.clone()));
            };

            let updated = match outcome {
                Ok(result) => existing.with_snapshot(snapshot, result.is_fresh, Utc::now()),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Freshness check failed");
                    existing.with_error(snapshot, err, Utc::now())
                }
            };
            let status = updated.status;
            entries.insert(path.clone(), Arc::new(updated));
            Ok(status)
        })?;

        debug!(path = %path.display(), status = %status, "File state updated");
        Ok(status)
    }

    /// Whether the stored snapshot of `path` no longer matches the live file.
    ///
    /// Untracked paths are never stale. A failed comparison counts as stale; the
    /// entry itself is left untouched either way.
    pub fn is_stale(&self, path: impl AsRef<Path>) -> bool {
        let Some(entry) = self.get_file_status(path) else {
            return false;
        };

        match self.evaluator.compare(&entry.path, &entry.snapshot) {
            Ok(result) => !result.is_fresh,
            Err(err) => {
                debug!(path = %entry.path.display(), error = %err, "Cannot confirm freshness, treating as stale");
                true
            }
        }
    }

    /// Re-reads a tracked file and installs the new snapshot.
    ///
    /// Returns `true` if the entry ended up current. On a failed read the entry
    /// moves to `error` and keeps its previous snapshot. Untracked paths return
    /// `false` without side effects.
    pub fn refresh(&self, path: impl AsRef<Path>) -> bool {
        let path = normalize(path.as_ref());
        let refreshed = self.with_path_lock(&path, || {
            if !self.read_entries().contains_key(&path) {
                return None;
            }

            let outcome = self.evaluator.capture(&path);

            let mut entries = self.write_entries();
            let existing = entries.get(&path)?;

            // A snapshot just captured describes the live file by construction.
            let (updated, current) = match outcome {
                Ok(snapshot) => (existing.with_snapshot(Arc::new(snapshot), true, Utc::now()), true),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Refresh failed");
                    let kept = Arc::clone(&existing.snapshot);
                    (existing.with_error(kept, err, Utc::now()), false)
                }
            };
            entries.insert(path.clone(), Arc::new(updated));
            Some(current)
        });

        let Some(current) = refreshed else {
            return false;
        };
        debug!(path = %path.display(), current, "File refreshed");
        current
    }

    /// Refreshes every tracked file in parallel and returns the resulting counts.
    pub fn refresh_all(&self) -> StatusCounts {
        let paths = self.tracked_paths();
        let refreshed = paths.par_iter().filter(|path| self.refresh(path)).count();
        info!(total = paths.len(), refreshed, "Refreshed all tracked files");
        self.stats()
    }

    /// Stops tracking `path`. Returns whether it was tracked.
    pub fn remove(&self, path: impl AsRef<Path>) -> bool {
        let path = normalize(path.as_ref());
        let removed = self.with_path_lock(&path, || self.write_entries().remove(&path).is_some());

        if removed {
            debug!(path = %path.display(), "File removed from tracking");
        }
        removed
    }

    /// Forgets every tracked file.
    pub fn clear(&self) {
        let cleared = {
            let mut entries = self.write_entries();
            let count = entries.len();
            entries.clear();
            count
        };
        self.path_locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        info!(cleared, "Cleared all tracked files");
    }

    /// Current entry for `path`, or `None` if it is not tracked.
    #[must_use]
    pub fn get_file_status(&self, path: impl AsRef<Path>) -> Option<Arc<TrackedFile>> {
        let path = normalize(path.as_ref());
        self.read_entries().get(&path).cloned()
    }

    /// Entries currently in `status`, in no particular order.
    #[must_use]
    pub fn get_by_status(&self, status: FileStatus) -> Vec<Arc<TrackedFile>> {
        self.read_entries()
            .values()
            .filter(|entry| entry.status == status)
            .cloned()
            .collect()
    }

    /// Every entry, in no particular order.
    #[must_use]
    pub fn entries(&self) -> Vec<Arc<TrackedFile>> {
        self.read_entries().values().cloned().collect()
    }

    /// Count of entries per status. The total always equals [`len`](Self::len).
    #[must_use]
    pub fn stats(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for entry in self.read_entries().values() {
            counts.record(entry.status);
        }
        counts
    }

    /// Every tracked path, in no particular order.
    #[must_use]
    pub fn tracked_paths(&self) -> Vec<PathBuf> {
        self.read_entries().keys().cloned().collect()
    }

    /// Whether `path` is tracked.
    #[must_use]
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        let path = normalize(path.as_ref());
        self.read_entries().contains_key(&path)
    }

    /// Number of tracked files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    /// Whether nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    /// Inserts `path` as current and evicts on overflow.
    fn install_current(&self, path: PathBuf, snapshot: Snapshot) -> (Arc<TrackedFile>, Option<PathBuf>) {
        let (entry, evicted) = self.with_path_lock(&path, || {
            let mut entries = self.write_entries();
            let seq = entries
                .get(&path)
                .map_or_else(|| self.next_seq.fetch_add(1, Ordering::Relaxed), |e| e.seq);
            let entry = Arc::new(TrackedFile::current(path.clone(), Arc::new(snapshot), Utc::now(), seq));
            entries.insert(path.clone(), Arc::clone(&entry));
            let evicted = self.evict_overflow(&mut entries, &path);
            (entry, evicted)
        });

        debug!(path = %path.display(), "File registered");
        if let Some(evicted) = &evicted {
            info!(
                evicted = %evicted.display(),
                capacity = self.max_tracked_files,
                "Capacity reached, evicted oldest tracked file"
            );
            self.prune_lock(evicted);
        }
        (entry, evicted)
    }

    /// Removes one entry other than `keep` if the map is over capacity.
    fn evict_overflow(&self, entries: &mut EntryMap, keep: &Path) -> Option<PathBuf> {
        if entries.len() <= self.max_tracked_files {
            return None;
        }

        let victim = entries
            .values()
            .filter(|entry| entry.path != keep)
            .min_by_key(|entry| entry.eviction_key())
            .map(|entry| entry.path.clone())?;

        entries.remove(&victim);
        Some(victim)
    }

    /// Runs `f` holding the mutex for `path`, then drops the mutex from the
    /// lock table unless another operation is waiting on it.
    fn with_path_lock<R>(&self, path: &Path, f: impl FnOnce() -> R) -> R {
        let result = {
            let lock = Arc::clone(&self.path_locks.entry(path.to_path_buf()).or_default());
            let _serial = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        self.prune_lock(path);
        result
    }

    /// Drops the per-path mutex unless another operation still holds it.
    fn prune_lock(&self, path: &Path) {
        self.path_locks
            .remove_if(path, |_, lock| Arc::strong_count(lock) == 1);
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, EntryMap> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, EntryMap> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registry keys are absolute paths; relative ones resolve against the cwd.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
