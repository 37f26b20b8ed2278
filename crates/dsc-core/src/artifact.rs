//! Served configuration and module payloads.

use bytes::Bytes;
use sha2::{Digest, Sha256};

/// Checksum algorithm name sent in the `ChecksumAlgorithm` header.
pub const CHECKSUM_ALGORITHM: &str = "SHA-256";

/// Returns the uppercase hex SHA-256 digest of `content`.
#[must_use]
pub fn sha256_checksum(content: &[u8]) -> String {
    hex::encode_upper(Sha256::digest(content))
}

/// A configuration document or module archive together with its checksum.
///
/// The checksum always describes exactly the bytes in `content`; build
/// artifacts with [`Artifact::from_content`] unless a backend has already
/// hashed the same bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Raw payload served as `application/octet-stream`.
    pub content: Bytes,
    /// Uppercase hex digest of `content`.
    pub checksum: String,
    /// Name of the digest algorithm.
    pub checksum_algorithm: String,
}

impl Artifact {
    /// Hashes `content` and wraps it.
    pub fn from_content(content: impl Into<Bytes>) -> Self {
        let content = content.into();
        let checksum = sha256_checksum(&content);
        Self {
            content,
            checksum,
            checksum_algorithm: CHECKSUM_ALGORITHM.to_string(),
        }
    }

    /// Length of the payload in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Returns true when the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
