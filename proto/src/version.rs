use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::DataError;

/// Content-hash identifier of an item (`h.v`). Equal across perspectives
/// when the underlying content is semantically equal; absent on a "virtual"
/// head representing an in-flight merge that has not yet been inserted.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version([u8; 32]);

impl Version {
    pub fn from_bytes(bytes: [u8; 32]) -> Self { Self(bytes) }

    pub fn to_bytes(&self) -> [u8; 32] { self.0 }

    /// Derive a version from arbitrary content bytes. Used by callers and
    /// tests to build realistic content-addressed versions; the core never
    /// calls this itself (it only ever observes versions, never mints them
    /// for persisted items -- see `Header::v`).
    pub fn hash(content: &[u8]) -> Self {
        let digest = Sha256::digest(content);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub fn to_base64(&self) -> String { general_purpose::URL_SAFE_NO_PAD.encode(self.0) }

    pub fn to_base64_short(&self) -> String {
        let full = self.to_base64();
        full[full.len() - 6..].to_string()
    }

    pub fn from_base64(input: impl AsRef<[u8]>) -> Result<Self, DataError> {
        let decoded = general_purpose::URL_SAFE_NO_PAD.decode(input)?;
        let bytes: [u8; 32] =
            decoded.try_into().map_err(|v: Vec<u8>| DataError::InvalidVersionLength { expected: 32, got: v.len() })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}", self.to_base64_short())
        } else {
            write!(f, "{}", self.to_base64())
        }
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Version({})", self.to_base64_short()) }
}
