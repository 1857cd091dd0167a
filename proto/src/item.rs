use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Body, Header, Version};

/// The unit of replication: a header plus its opaque body. Items are
/// immutable once persisted; the engine only ever observes them (borrowed
/// from a store) or allocates new ones as merge output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub h: Header,
    pub b: Option<Body>,
}

impl Item {
    pub fn new(h: Header, b: Option<Body>) -> Self { Self { h, b } }

    pub fn version(&self) -> Option<Version> { self.h.v }

    pub fn parents(&self) -> &[Version] { &self.h.pa }

    /// Body to use when a merge needs a concrete mapping rather than "unset
    /// means unchanged" -- missing body is treated as `{}` for
    /// merges (as opposed to fast-forwards, where the caller deals with the
    /// distinction directly).
    pub fn body_or_empty(&self) -> Body { self.b.clone().unwrap_or_default() }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.h.v.map(|v| v.to_base64_short()).unwrap_or_else(|| "virtual".to_string());
        write!(f, "Item({} {} pa={:?} pe={} d={})", self.h.id, v, self.h.pa, self.h.pe, self.h.d)
    }
}
