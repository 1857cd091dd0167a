use serde::{Deserialize, Serialize};

use crate::{ItemId, PerspectiveId, Version};

/// Everything about a versioned item except its body. Versions are
/// content-addressed and immutable: two headers sharing `v` under the same
/// perspective have identical `pa` (and, on the owning [`crate::Item`],
/// identical body).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Logical identity of the tracked object.
    pub id: ItemId,

    /// Content-hash version, absent on a virtual (not-yet-inserted) head.
    pub v: Option<Version>,

    /// Ordered list of parent versions: empty for roots, one for linear
    /// history, two or more for merges.
    pub pa: Vec<Version>,

    /// Which peer this image of the item belongs to.
    pub pe: PerspectiveId,

    /// Monotonic local insertion index under the local perspective; absent
    /// for remote perspectives.
    pub i: Option<u64>,

    /// Tombstone marker. When set, the object is considered deleted at this
    /// version; a later edit to the body is a legal "undelete."
    pub d: bool,
}

impl Header {
    /// A header is a virtual head iff it has no version yet.
    pub fn is_virtual(&self) -> bool { self.v.is_none() }
}
