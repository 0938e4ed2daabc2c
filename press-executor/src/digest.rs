//! SHA-256 digest of compiled artifacts.

use std::fmt;

use sha2::{Digest, Sha256};

/// SHA-256 of an artifact, displayed as 64 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactDigest([u8; 32]);

impl ArtifactDigest {
    /// Hash `artifact`.
    ///
    /// # Complexity
    /// O(n) in the artifact length.
    #[must_use]
    pub fn of(artifact: &[u8]) -> Self {
        Self(Sha256::digest(artifact).into())
    }

    /// Returns the raw 32-byte digest.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ArtifactDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
