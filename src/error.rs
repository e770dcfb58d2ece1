use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Machine-readable reason a file could not be stat'd or read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessReason {
    /// The path does not exist
    NotFound,
    /// The process lacks permission to stat or read the path
    PermissionDenied,
    /// The path exists but is not a regular file
    NotAFile,
    /// Any other I/O failure
    Io,
}

impl AccessReason {
    /// Stable snake_case name, e.g. `not_found`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::PermissionDenied => "permission_denied",
            Self::NotAFile => "not_a_file",
            Self::Io => "io",
        }
    }
}

impl fmt::Display for AccessReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<io::ErrorKind> for AccessReason {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::IsADirectory => Self::NotAFile,
            _ => Self::Io,
        }
    }
}

/// The filesystem could not be stat'd or read for a path.
///
/// Carries the reason code for programmatic handling and the underlying
/// system error text for humans.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{reason}] {}: {message}", .path.display())]
pub struct FileAccessError {
    /// Path the failed operation targeted
    pub path: PathBuf,
    /// Categorised failure reason
    pub reason: AccessReason,
    /// System error text
    pub message: String,
}

impl FileAccessError {
    /// Builds an error with an explicit reason.
    pub fn new(path: impl Into<PathBuf>, reason: AccessReason, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason,
            message: message.into(),
        }
    }

    /// Builds an error from an `io::Error` raised while accessing `path`.
    #[must_use]
    pub fn from_io(path: &Path, err: &io::Error) -> Self {
        Self::new(path, AccessReason::from(err.kind()), err.to_string())
    }

    /// The path does not exist.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(path, AccessReason::NotFound, "no such file or directory")
    }

    /// The path exists but is not a regular file.
    pub fn not_a_file(path: impl Into<PathBuf>) -> Self {
        Self::new(path, AccessReason::NotAFile, "not a regular file")
    }

    /// Whether the file was missing, as opposed to unreadable.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.reason == AccessReason::NotFound
    }
}

/// Errors surfaced by the tracking registry.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// An operation that requires an existing entry was called on an untracked path
    #[error("file is not tracked: {}", .0.display())]
    NotTracked(PathBuf),

    /// The filesystem could not be accessed
    #[error(transparent)]
    FileAccess(#[from] FileAccessError),

    /// The tracker was constructed with an unusable configuration
    #[error("invalid tracker configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, TrackerError>;
