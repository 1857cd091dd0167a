//! Shared fixtures for the scenario/property integration tests.
//! A minimal in-memory `Store`, built against only the crate's public API
//! (a minimal in-memory mock store keyed by id, perspective, and version).

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use perspectivedb_core::proto::{Body, Header, Item, ItemId, PerspectiveId, Version};
use perspectivedb_core::{ItemCursor, ReconcileError, Selector, Store, Tree};

pub fn item(id: ItemId, v: Version, pa: Vec<Version>, pe: PerspectiveId, i: Option<u64>, b: Body) -> Item {
    Item::new(Header { id, v: Some(v), pa, pe, i, d: false }, Some(b))
}

pub struct MemStore {
    items: Vec<Item>,
}

impl MemStore {
    pub fn from_items(items: Vec<Item>) -> Self { Self { items } }
}

#[async_trait]
impl Store for MemStore {
    async fn scan(&self, id: &ItemId, perspective: &PerspectiveId) -> Result<Box<dyn ItemCursor>, ReconcileError> {
        let mut matches: Vec<Item> = self.items.iter().filter(|it| &it.h.id == id && &it.h.pe == perspective).cloned().collect();
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

pub fn tree(store: Arc<MemStore>, id: ItemId, pe: PerspectiveId) -> Tree<MemStore> { Tree::new(store, Selector::for_id(id), pe) }
