use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An attribute value within a [`Body`]. Recursive so that nested mappings
/// compare structurally, per the data model's equality rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat),
    Text(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(Body),
}

/// Wraps `f64` with a total-order-ish `PartialEq` suitable for structural
/// body comparison (NaN is never produced by ordinary attribute values, and
/// a NaN != NaN reading is the one `f64` gives us anyway, so no special
/// casing is attempted here).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool { self.0 == other.0 }
}

/// Opaque, unordered mapping from attribute name to value (`b`). Missing
/// body on an [`crate::Item`] means "unchanged since parent" for
/// fast-forwards, but `{}` for merges, per the data model's lifecycle rule.
pub type Body = BTreeMap<String, Value>;
