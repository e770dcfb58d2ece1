use crate::hash::{ContentDigest, HashAlgorithm, hash_bytes};
use std::sync::Arc;
use std::time::SystemTime;

/// What a snapshot remembers about the file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotContent {
    /// Full content, kept for byte comparison and diffing
    Raw(Arc<[u8]>),
    /// Content digest only
    Digest(ContentDigest),
}

impl SnapshotContent {
    /// Digest of the content under `algorithm`.
    ///
    /// Raw content is hashed on demand; a stored digest is returned as is, even
    /// when it was produced by a different algorithm.
    #[must_use]
    pub fn digest(&self, algorithm: HashAlgorithm) -> ContentDigest {
        match self {
            Self::Raw(bytes) => hash_bytes(algorithm, bytes),
            Self::Digest(digest) => digest.clone(),
        }
    }

    /// The raw bytes, if this snapshot kept them.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Raw(bytes) => Some(bytes),
            Self::Digest(_) => None,
        }
    }
}

/// Immutable capture of a file's content and metadata at one instant.
///
/// Never mutated once built; an update installs a new snapshot instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    content: SnapshotContent,
    modified: SystemTime,
    size: u64,
}

impl Snapshot {
    /// Snapshot from parts, as captured by the caller.
    #[must_use]
    pub const fn new(content: SnapshotContent, modified: SystemTime, size: u64) -> Self {
        Self {
            content,
            modified,
            size,
        }
    }

    /// Snapshot holding raw bytes; the size is the content length.
    #[must_use]
    pub fn from_bytes(content: impl Into<Arc<[u8]>>, modified: SystemTime) -> Self {
        let content: Arc<[u8]> = content.into();
        let size = content.len() as u64;
        Self::new(SnapshotContent::Raw(content), modified, size)
    }

    /// Snapshot that keeps only a content digest.
    #[must_use]
    pub const fn from_digest(digest: ContentDigest, modified: SystemTime, size: u64) -> Self {
        Self::new(SnapshotContent::Digest(digest), modified, size)
    }

    /// Stored content or digest.
    #[must_use]
    pub const fn content(&self) -> &SnapshotContent {
        &self.content
    }

    /// Modification time, at the resolution the platform reported it.
    #[must_use]
    pub const fn modified(&self) -> SystemTime {
        self.modified
    }

    /// Size in bytes when captured.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_from_bytes_sets_size() {
        let snapshot = Snapshot::from_bytes(b"Hello, world!".to_vec(), UNIX_EPOCH);
        assert_eq!(snapshot.size(), 13);
        assert_eq!(snapshot.content().as_bytes(), Some(&b"Hello, world!"[..]));
    }

    #[test]
    fn test_digest_of_raw_matches_direct_hash() {
        let snapshot = Snapshot::from_bytes(b"abc".to_vec(), UNIX_EPOCH);
        let expected = hash_bytes(HashAlgorithm::Xxh3, b"abc");
        assert_eq!(snapshot.content().digest(HashAlgorithm::Xxh3), expected);
    }

    #[test]
    fn test_stored_digest_returned_unchanged() {
        let digest = hash_bytes(HashAlgorithm::Sha256, b"abc");
        let snapshot = Snapshot::from_digest(digest.clone(), UNIX_EPOCH, 3);
        assert_eq!(snapshot.content().digest(HashAlgorithm::Xxh3), digest);
        assert!(snapshot.content().as_bytes().is_none());
    }

    #[test]
    fn test_nanosecond_mtime_kept() {
        let modified = UNIX_EPOCH + Duration::new(1_700_000_000, 123_456_789);
        let snapshot = Snapshot::from_bytes(Vec::new(), modified);
        assert_eq!(snapshot.modified(), modified);
        assert_ne!(snapshot.modified(), UNIX_EPOCH + Duration::from_secs(1_700_000_000));
    }
}
