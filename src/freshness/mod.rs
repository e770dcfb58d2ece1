//! Freshness evaluation: decides whether a [`Snapshot`] still describes the
//! live file and captures new snapshots.
//!
//! Two comparison policies exist:
//!
//! - **metadata** (default): fresh iff the live mtime and size are exactly equal
//!   to the snapshot's. Timestamps are compared at full resolution, with no
//!   tolerance window.
//! - **content hash**: the live content is re-read and digested; fresh iff the
//!   digest matches the snapshot's.

mod snapshot;

pub use snapshot::{Snapshot, SnapshotContent};

use crate::error::FileAccessError;
use crate::fs::{FileStat, FileSystem};
use crate::hash::HashAlgorithm;
use std::path::Path;
use std::sync::Arc;
use tracing::{Level, debug, span};

/// Verdict of a freshness comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessResult {
    /// Whether the snapshot still matches the live file
    pub is_fresh: bool,
    /// Live metadata observed during the comparison
    pub live: FileStat,
}

/// Compares snapshots against the filesystem and captures new ones.
#[derive(Clone)]
pub struct FreshnessEvaluator {
    fs: Arc<dyn FileSystem>,
    use_content_hash: bool,
    algorithm: HashAlgorithm,
}

impl std::fmt::Debug for FreshnessEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreshnessEvaluator")
            .field("use_content_hash", &self.use_content_hash)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl FreshnessEvaluator {
    /// Creates an evaluator reading through `fs`.
    #[must_use]
    pub fn new(fs: Arc<dyn FileSystem>, use_content_hash: bool, algorithm: HashAlgorithm) -> Self {
        Self {
            fs,
            use_content_hash,
            algorithm,
        }
    }

    /// Whether freshness is decided by content digest rather than metadata.
    #[must_use]
    pub const fn uses_content_hash(&self) -> bool {
        self.use_content_hash
    }

    /// Digest algorithm for content-hash mode.
    #[must_use]
    pub const fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// The filesystem this evaluator reads through.
    #[must_use]
    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Captures a fresh snapshot of `path`.
    ///
    /// In content-hash mode only the digest is kept; otherwise the raw bytes are.
    ///
    /// # Errors
    ///
    /// Returns a [`FileAccessError`] if the path cannot be stat'd or read.
    pub fn capture(&self, path: &Path) -> Result<Snapshot, FileAccessError> {
        let span = span!(Level::DEBUG, "capture", path = %path.display());
        let _guard = span.enter();

        let stat = self.fs.stat(path)?;

        let snapshot = if self.use_content_hash {
            let digest = self.fs.digest(path, self.algorithm)?;
            Snapshot::from_digest(digest, stat.modified, stat.size)
        } else {
            let content = self.fs.read_all(path)?;
            if content.len() as u64 != stat.size {
                // Written between stat and read. The size follows the bytes we
                // hold; the older mtime makes the next compare report stale.
                debug!(stat_size = stat.size, read_size = content.len(), "File changed during capture");
            }
            Snapshot::from_bytes(content, stat.modified)
        };

        debug!(size = snapshot.size(), "Snapshot captured");
        Ok(snapshot)
    }

    /// Compares `snapshot` against the live state of `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`FileAccessError`] if the path is no longer accessible. That
    /// means freshness could not be confirmed; it is not a stale verdict.
    pub fn compare(&self, path: &Path, snapshot: &Snapshot) -> Result<FreshnessResult, FileAccessError> {
        let span = span!(Level::DEBUG, "compare", path = %path.display());
        let _guard = span.enter();

        let live = self.fs.stat(path)?;

        let is_fresh = if self.use_content_hash {
            let live_digest = self.fs.digest(path, self.algorithm)?;
            live_digest == snapshot.content().digest(self.algorithm)
        } else {
            live.modified == snapshot.modified() && live.size == snapshot.size()
        };

        debug!(is_fresh, content_hash = self.use_content_hash, "Freshness compared");
        Ok(FreshnessResult { is_fresh, live })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::OsFileSystem;
    use crate::hash::hash_bytes;
    use filetime::{FileTime, set_file_mtime};
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::tempdir;

    fn evaluator(use_content_hash: bool) -> FreshnessEvaluator {
        FreshnessEvaluator::new(
            Arc::new(OsFileSystem::default()),
            use_content_hash,
            HashAlgorithm::Sha256,
        )
    }

    #[test]
    fn test_capture_keeps_raw_content() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "Hello, world!")?;

        let snapshot = evaluator(false).capture(&path)?;
        assert_eq!(snapshot.size(), 13);
        assert_eq!(snapshot.content().as_bytes(), Some(&b"Hello, world!"[..]));
        assert!(evaluator(false).compare(&path, &snapshot)?.is_fresh);

        Ok(())
    }

    /// Reports a stat taken before a concurrent write, then the written bytes.
    struct WrittenDuringRead;

    impl FileSystem for WrittenDuringRead {
        fn stat(&self, _path: &Path) -> Result<FileStat, FileAccessError> {
            Ok(FileStat {
                modified: UNIX_EPOCH + Duration::from_secs(10),
                size: 5,
            })
        }

        fn read_all(&self, _path: &Path) -> Result<Vec<u8>, FileAccessError> {
            Ok(b"longer content".to_vec())
        }
    }

    #[test]
    fn test_capture_size_matches_content_read() -> anyhow::Result<()> {
        let evaluator = FreshnessEvaluator::new(Arc::new(WrittenDuringRead), false, HashAlgorithm::Sha256);

        let snapshot = evaluator.capture(Path::new("/racy.txt"))?;

        assert_eq!(snapshot.size(), 14);
        assert_eq!(snapshot.content().as_bytes(), Some(&b"longer content"[..]));
        // The live stat still disagrees, so the snapshot is never taken as fresh
        assert!(!evaluator.compare(Path::new("/racy.txt"), &snapshot)?.is_fresh);

        Ok(())
    }

    #[test]
    fn test_capture_in_hash_mode_keeps_digest() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "Hello, world!")?;

        let snapshot = evaluator(true).capture(&path)?;
        assert_eq!(
            snapshot.content(),
            &SnapshotContent::Digest(hash_bytes(HashAlgorithm::Sha256, b"Hello, world!"))
        );

        Ok(())
    }

    #[test]
    fn test_mtime_change_same_size_is_stale() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "Hello, world!")?;
        set_file_mtime(&path, FileTime::from_unix_time(1_000_000, 0))?;

        let snapshot = evaluator(false).capture(&path)?;
        set_file_mtime(&path, FileTime::from_unix_time(2_000_000, 0))?;

        let result = evaluator(false).compare(&path, &snapshot)?;
        assert!(!result.is_fresh);
        assert_eq!(result.live.size, 13);

        Ok(())
    }

    #[test]
    fn test_sub_second_mtime_difference_is_stale() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "x")?;
        set_file_mtime(&path, FileTime::from_unix_time(1_700_000_000, 500_000_000))?;

        let live = std::fs::metadata(&path)?.modified()?;
        // same second, different nanoseconds
        let snapshot = Snapshot::from_bytes(
            b"x".to_vec(),
            UNIX_EPOCH + Duration::from_secs(1_700_000_000),
        );
        if live == snapshot.modified() {
            // filesystem without sub-second resolution
            return Ok(());
        }

        assert!(!evaluator(false).compare(&path, &snapshot)?.is_fresh);
        Ok(())
    }

    #[test]
    fn test_hash_mode_ignores_touch() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "stable")?;

        let snapshot = evaluator(true).capture(&path)?;
        set_file_mtime(&path, FileTime::from_unix_time(42, 0))?;

        assert!(evaluator(true).compare(&path, &snapshot)?.is_fresh);
        assert!(!evaluator(false).compare(&path, &snapshot)?.is_fresh);

        Ok(())
    }

    #[test]
    fn test_hash_mode_accepts_raw_snapshot() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "content")?;

        let raw = Snapshot::from_bytes(b"content".to_vec(), UNIX_EPOCH);
        assert!(evaluator(true).compare(&path, &raw)?.is_fresh);

        let other = Snapshot::from_bytes(b"CONTENT".to_vec(), UNIX_EPOCH);
        assert!(!evaluator(true).compare(&path, &other)?.is_fresh);

        Ok(())
    }

    #[test]
    fn test_compare_missing_file_errors() {
        let snapshot = Snapshot::from_bytes(b"gone".to_vec(), UNIX_EPOCH);
        let err = evaluator(false)
            .compare(Path::new("/no/such/file.txt"), &snapshot)
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
