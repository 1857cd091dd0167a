//! Round-trip serialization tests for the wire-agnostic data model.
//!
//! The crate does not prescribe a wire format, but it promises
//! preserved, byte-for-byte equality of `Version` across perspectives --
//! anything a transport crate picks (JSON, bincode, ...) must round-trip
//! the data model faithfully. These tests exercise two representative
//! formats without committing the crate itself to either.

use std::collections::BTreeMap;

use perspectivedb_proto::{Header, Item, ItemId, PerspectiveId, Value, Version};

fn sample_item() -> Item {
    let mut body = BTreeMap::new();
    body.insert("name".to_string(), Value::Text("widget".to_string()));
    body.insert("count".to_string(), Value::Int(3));
    body.insert("tags".to_string(), Value::List(vec![Value::Text("a".to_string()), Value::Text("b".to_string())]));

    let mut nested = BTreeMap::new();
    nested.insert("inner".to_string(), Value::Bool(true));
    body.insert("meta".to_string(), Value::Map(nested));

    let parent = Version::hash(b"parent");
    let header = Header {
        id: ItemId::from("widget-1"),
        v: Some(Version::hash(b"widget-1-v2")),
        pa: vec![parent],
        pe: PerspectiveId::from("peer-a"),
        i: Some(7),
        d: false,
    };
    Item::new(header, Some(body))
}

#[test]
fn json_round_trip_preserves_structure() {
    let item = sample_item();
    let encoded = serde_json::to_string(&item).expect("serialize");
    let decoded: Item = serde_json::from_str(&encoded).expect("deserialize");
    assert_eq!(decoded, item);
}

#[test]
fn bincode_round_trip_preserves_version_identity() {
    let item = sample_item();
    let encoded = bincode::serialize(&item).expect("serialize");
    let decoded: Item = bincode::deserialize(&encoded).expect("deserialize");
    assert_eq!(decoded.h.v, item.h.v, "version must survive a wire round-trip byte-for-byte");
    assert_eq!(decoded, item);
}

#[test]
fn virtual_head_has_no_version_across_formats() {
    let header = Header { id: ItemId::from("widget-2"), v: None, pa: vec![], pe: PerspectiveId::from("peer-a"), i: None, d: false };
    let item = Item::new(header, None);
    assert!(item.h.is_virtual());

    let encoded = serde_json::to_string(&item).unwrap();
    let decoded: Item = serde_json::from_str(&encoded).unwrap();
    assert!(decoded.h.is_virtual());
}
