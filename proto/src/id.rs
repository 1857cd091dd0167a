use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DataError;

/// Maximum length in bytes of a logical item id.
///
/// Treated as a protocol-level invariant rather than an index-size
/// constraint: the core has no index of its own to size against, so the
/// limit exists purely to bound how much an implementer may pack into `h.id`.
pub const MAX_ITEM_ID_LEN: usize = 254;

/// Logical identity of a tracked object (`h.id`). Two items share history
/// iff their ids are equal.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(Vec<u8>);

impl ItemId {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, DataError> {
        let bytes = bytes.into();
        if bytes.len() > MAX_ITEM_ID_LEN {
            return Err(DataError::IdTooLong { max: MAX_ITEM_ID_LEN, got: bytes.len() });
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] { &self.0 }

    pub fn to_base64(&self) -> String { general_purpose::URL_SAFE_NO_PAD.encode(&self.0) }

    pub fn from_base64(input: impl AsRef<[u8]>) -> Result<Self, DataError> {
        let decoded = general_purpose::URL_SAFE_NO_PAD.decode(input)?;
        Self::new(decoded)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.to_base64()) }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "ItemId({})", self.to_base64()) }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self { Self(s.as_bytes().to_vec()) }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self { Self(s.into_bytes()) }
}
