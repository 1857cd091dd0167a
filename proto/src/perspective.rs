use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DataError;

/// Tags which peer's image of an item this is (`h.pe`). Two items with the
/// same `h.v` from different perspectives differ only in fields private to
/// that perspective.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PerspectiveId(String);

impl PerspectiveId {
    pub fn new(tag: impl Into<String>) -> Result<Self, DataError> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(DataError::EmptyPerspective);
        }
        Ok(Self(tag))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for PerspectiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl fmt::Debug for PerspectiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "PerspectiveId({})", self.0) }
}

impl From<&str> for PerspectiveId {
    fn from(s: &str) -> Self { Self(s.to_string()) }
}
