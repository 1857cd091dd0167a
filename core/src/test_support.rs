//! In-memory store used by this crate's own unit tests (not exported).
//! Mirrors the style of an in-memory mock store keyed by id and version.

use async_trait::async_trait;
use perspectivedb_proto::{Body, Header, Item, ItemId, PerspectiveId, Version};

use crate::error::ReconcileError;
use crate::traits::{ItemCursor, Store};

/// Build a persisted item with an empty body, for tests that only care
/// about DAG shape.
pub fn item(id: ItemId, v: Version, pa: Vec<Version>, pe: PerspectiveId, i: Option<u64>) -> Item {
    Item::new(Header { id, v: Some(v), pa, pe, i, d: false }, Some(Body::new()))
}

/// Fixed set of items, queried in memory. `scan` returns them in descending
/// `h.i` order, mirroring the real ordering contract for a local
/// perspective; this store does not model remote perspectives'
/// insertion-order fallback since tests never need it.
pub struct MemStore {
    items: Vec<Item>,
}

impl MemStore {
    pub fn from_edges(items: Vec<Item>) -> Self { Self { items } }
}

#[async_trait]
impl Store for MemStore {
    async fn scan(&self, id: &ItemId, perspective: &PerspectiveId) -> Result<Box<dyn ItemCursor>, ReconcileError> {
        let mut matches: Vec<Item> =
            self.items.iter().filter(|it| &it.h.id == id && &it.h.pe == perspective).cloned().collect();
        matches.sort_by(|a, b| b.h.i.cmp(&a.h.i));
        Ok(Box::new(VecCursor { items: matches.into_iter() }))
    }

    async fn get_by_version(&self, id: &ItemId, perspective: &PerspectiveId, v: &Version) -> Result<Option<Item>, ReconcileError> {
        Ok(self.items.iter().find(|it| &it.h.id == id && &it.h.pe == perspective && it.h.v.as_ref() == Some(v)).cloned())
    }
}

struct VecCursor {
    items: std::vec::IntoIter<Item>,
}

#[async_trait]
impl ItemCursor for VecCursor {
    async fn next(&mut self) -> Result<Option<Item>, ReconcileError> { Ok(self.items.next()) }
}
