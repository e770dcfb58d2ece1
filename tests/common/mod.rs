#![allow(dead_code)]

use readtrack::config::TrackingConfig;
use readtrack::fs::{FileStat, FileSystem};
use readtrack::{AccessReason, FileAccessError, FileTracker, Snapshot};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
struct FakeFile {
    content: Vec<u8>,
    modified: SystemTime,
    denied: bool,
}

/// In-memory filesystem with controllable mtimes and failures.
#[derive(Debug, Default)]
pub struct FakeFs {
    files: Mutex<HashMap<PathBuf, FakeFile>>,
}

/// Seconds since the epoch as a `SystemTime`.
pub fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

impl FakeFs {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn write(&self, path: impl Into<PathBuf>, content: &str, modified: SystemTime) {
        self.files.lock().unwrap().insert(
            path.into(),
            FakeFile {
                content: content.as_bytes().to_vec(),
                modified,
                denied: false,
            },
        );
    }

    /// Changes the mtime, leaving content alone.
    pub fn touch(&self, path: &Path, modified: SystemTime) {
        if let Some(file) = self.files.lock().unwrap().get_mut(path) {
            file.modified = modified;
        }
    }

    pub fn delete(&self, path: &Path) {
        self.files.lock().unwrap().remove(path);
    }

    pub fn deny(&self, path: &Path) {
        if let Some(file) = self.files.lock().unwrap().get_mut(path) {
            file.denied = true;
        }
    }

    /// Raw snapshot of the current fake content.
    pub fn snapshot(&self, path: &Path) -> Snapshot {
        let files = self.files.lock().unwrap();
        let file = files.get(path).expect("fake file exists");
        Snapshot::from_bytes(file.content.clone(), file.modified)
    }

    fn lookup(&self, path: &Path) -> Result<FakeFile, FileAccessError> {
        let files = self.files.lock().unwrap();
        let file = files.get(path).ok_or_else(|| {
            FileAccessError::new(
                path,
                AccessReason::NotFound,
                format!("ENOENT: no such file or directory, stat '{}'", path.display()),
            )
        })?;
        if file.denied {
            return Err(FileAccessError::new(
                path,
                AccessReason::PermissionDenied,
                "EACCES: permission denied",
            ));
        }
        Ok(file.clone())
    }
}

impl FileSystem for FakeFs {
    fn stat(&self, path: &Path) -> Result<FileStat, FileAccessError> {
        let file = self.lookup(path)?;
        Ok(FileStat {
            modified: file.modified,
            size: file.content.len() as u64,
        })
    }

    fn read_all(&self, path: &Path) -> Result<Vec<u8>, FileAccessError> {
        Ok(self.lookup(path)?.content)
    }
}

pub fn config(max_tracked_files: usize) -> TrackingConfig {
    TrackingConfig {
        max_tracked_files,
        ..TrackingConfig::default()
    }
}

/// Tracker over a fresh fake filesystem.
pub fn fake_tracker(config: &TrackingConfig) -> (Arc<FakeFs>, FileTracker) {
    let fs = FakeFs::new();
    let tracker = FileTracker::new(fs.clone(), config).expect("valid config");
    (fs, tracker)
}
