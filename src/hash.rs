use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::Read;
use xxhash_rust::xxh3::{Xxh3, xxh3_128};

/// Digest algorithm used in content-hash mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256, collision resistant
    #[default]
    Sha256,
    /// XXH3 128-bit, much faster but not cryptographic
    Xxh3,
}

impl HashAlgorithm {
    /// Name used in config files and digest prefixes.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Xxh3 => "xxh3",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hex digest of file content tagged with the algorithm that produced it.
///
/// Digests from different algorithms never compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentDigest {
    /// Algorithm that produced the digest
    pub algorithm: HashAlgorithm,
    /// Lowercase hex encoding
    pub hex: String,
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hex)
    }
}

/// Hashes a byte slice in one pass.
#[must_use]
pub fn hash_bytes(algorithm: HashAlgorithm, data: &[u8]) -> ContentDigest {
    let hex = match algorithm {
        HashAlgorithm::Sha256 => format!("{:x}", Sha256::digest(data)),
        HashAlgorithm::Xxh3 => format!("{:032x}", xxh3_128(data)),
    };
    ContentDigest { algorithm, hex }
}

/// Hashes everything readable from `reader` using a fixed 64KB buffer.
///
/// # Errors
///
/// Returns any error raised by the reader.
pub fn hash_reader<R: Read>(
    algorithm: HashAlgorithm,
    mut reader: R,
) -> std::io::Result<ContentDigest> {
    let mut buffer = vec![0u8; 65536];

    let hex = match algorithm {
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            loop {
                let bytes_read = reader.read(&mut buffer)?;
                if bytes_read == 0 {
                    break;
                }
                hasher.update(&buffer[..bytes_read]);
            }
            format!("{:x}", hasher.finalize())
        }
        HashAlgorithm::Xxh3 => {
            let mut hasher = Xxh3::new();
            loop {
                let bytes_read = reader.read(&mut buffer)?;
                if bytes_read == 0 {
                    break;
                }
                hasher.update(&buffer[..bytes_read]);
            }
            format!("{:032x}", hasher.digest128())
        }
    };

    Ok(ContentDigest { algorithm, hex })
}
