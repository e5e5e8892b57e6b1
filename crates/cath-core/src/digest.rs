//! # Payload Digest
//!
//! Content digest of a raw payload as held by the blob collaborator.
//! The core never inspects payload bytes after ingestion; the digest is
//! the opaque reference it hands to the blob store to get them back.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA-256 digest of a payload, hex-encoded. Serves as the opaque blob
/// reference stored on an [`Artefact`](crate::Artefact).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayloadDigest(String);

impl PayloadDigest {
    /// Compute the digest of a payload.
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = hasher.finalize();
        let mut hex = String::with_capacity(64);
        for byte in digest {
            use std::fmt::Write;
            // Infallible for String.
            let _ = write!(hex, "{byte:02x}");
        }
        Self(hex)
    }

    /// Wrap an already-computed hex digest (e.g. read back from storage).
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// The hex form of the digest.
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PayloadDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_64_hex_chars() {
        let d = PayloadDigest::of(b"{\"document\":{}}");
        assert_eq!(d.as_hex().len(), 64);
        assert!(d.as_hex().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(PayloadDigest::of(b"abc"), PayloadDigest::of(b"abc"));
        assert_ne!(PayloadDigest::of(b"abc"), PayloadDigest::of(b"abd"));
    }
}
