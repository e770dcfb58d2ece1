//! Filesystem access primitives used by the freshness evaluator.
//!
//! The evaluator never touches `std::fs` directly. Everything goes through the
//! [`FileSystem`] trait so the tracker can run against the real disk
//! ([`OsFileSystem`]) or against an in-memory double in tests.

use crate::error::FileAccessError;
use crate::hash::{ContentDigest, HashAlgorithm, hash_bytes, hash_reader};
use memmap2::MmapOptions;
use std::fs::File;
use std::path::Path;
use std::time::SystemTime;

/// Default size at which [`OsFileSystem`] switches from buffered reads to mmap.
pub const DEFAULT_MMAP_THRESHOLD: usize = 1_048_576;

/// Live metadata of a file, at full platform timestamp resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Last modification time
    pub modified: SystemTime,
    /// Size in bytes
    pub size: u64,
}

/// Inbound filesystem collaborator.
///
/// Implementations must be shareable across threads; the tracker calls them
/// without holding any registry lock.
pub trait FileSystem: Send + Sync {
    /// Stats a regular file.
    ///
    /// # Errors
    ///
    /// Returns a [`FileAccessError`] if the path cannot be stat'd or is not a file.
    fn stat(&self, path: &Path) -> Result<FileStat, FileAccessError>;

    /// Reads the whole file.
    ///
    /// # Errors
    ///
    /// Returns a [`FileAccessError`] if the path cannot be read.
    fn read_all(&self, path: &Path) -> Result<Vec<u8>, FileAccessError>;

    /// Digests the file content without keeping it.
    ///
    /// # Errors
    ///
    /// Returns a [`FileAccessError`] if the path cannot be read.
    fn digest(&self, path: &Path, algorithm: HashAlgorithm) -> Result<ContentDigest, FileAccessError> {
        let content = self.read_all(path)?;
        Ok(hash_bytes(algorithm, &content))
    }
}

/// [`FileSystem`] backed by `std::fs`.
///
/// Files at or above `mmap_threshold` bytes are memory mapped when digested.
#[derive(Debug, Clone)]
pub struct OsFileSystem {
    mmap_threshold: usize,
}

impl Default for OsFileSystem {
    fn default() -> Self {
        Self::new(DEFAULT_MMAP_THRESHOLD)
    }
}

impl OsFileSystem {
    /// Creates a backend that mmaps files of at least `mmap_threshold` bytes.
    #[must_use]
    pub const fn new(mmap_threshold: usize) -> Self {
        Self { mmap_threshold }
    }
}

impl FileSystem for OsFileSystem {
    fn stat(&self, path: &Path) -> Result<FileStat, FileAccessError> {
        let metadata = std::fs::metadata(path).map_err(|e| FileAccessError::from_io(path, &e))?;

        if !metadata.is_file() {
            return Err(FileAccessError::not_a_file(path));
        }

        let modified = metadata
            .modified()
            .map_err(|e| FileAccessError::from_io(path, &e))?;

        Ok(FileStat {
            modified,
            size: metadata.len(),
        })
    }

    fn read_all(&self, path: &Path) -> Result<Vec<u8>, FileAccessError> {
        std::fs::read(path).map_err(|e| FileAccessError::from_io(path, &e))
    }

    fn digest(&self, path: &Path, algorithm: HashAlgorithm) -> Result<ContentDigest, FileAccessError> {
        let file = File::open(path).map_err(|e| FileAccessError::from_io(path, &e))?;
        let len = file
            .metadata()
            .map_err(|e| FileAccessError::from_io(path, &e))?
            .len();

        if len == 0 {
            return Ok(hash_bytes(algorithm, b""));
        }

        if len < self.mmap_threshold as u64 {
            return hash_reader(algorithm, file).map_err(|e| FileAccessError::from_io(path, &e));
        }

        // SAFETY: the map is read-only and dropped before returning. A concurrent
        // truncation by another process can still fault, as with any mmap reader.
        let mmap = unsafe { MmapOptions::new().map(&file) }
            .map_err(|e| FileAccessError::from_io(path, &e))?;
        Ok(hash_bytes(algorithm, &mmap))
    }
}
