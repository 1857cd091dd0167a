//! External interfaces the engine consumes from a backing store.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use perspectivedb_proto::{Item, ItemId, PerspectiveId, Version};

use crate::error::ReconcileError;

/// A single pull-based cursor over a store's items for one id/perspective,
/// already sorted in a valid reverse-topological order (descending `h.i`
/// for the local perspective, descending insertion order for remote ones --
/// ordering contract described on `AncestorWalker`). This is the one primitive a persistence
/// layer must provide; everything else in this crate is built on top of it.
#[async_trait]
pub trait ItemCursor: Send {
    async fn next(&mut self) -> Result<Option<Item>, ReconcileError>;
}

/// Random access plus cursor access over the backing DAG store. Read-only:
/// the core never writes.
#[async_trait]
pub trait Store: Send + Sync {
    async fn scan(&self, id: &ItemId, perspective: &PerspectiveId) -> Result<Box<dyn ItemCursor>, ReconcileError>;

    /// Scoped by perspective as well as id: the same `(id, v)` pair can
    /// legitimately resolve to different bodies under different
    /// perspectives (perspective-private fields), so a tree
    /// bound to one perspective must never see another's copy.
    async fn get_by_version(&self, id: &ItemId, perspective: &PerspectiveId, v: &Version) -> Result<Option<Item>, ReconcileError>;
}

/// A pull-based item stream: the common interface for the ancestor walker
/// implementation, the concatenated/virtual-head stream, and any other
/// source feeding the LCA finder. Not pulling *is* backpressure -- there is no
/// separate pause/resume signal.
#[async_trait]
pub trait ItemStream: Send {
    async fn next(&mut self) -> Result<Option<Item>, ReconcileError>;

    /// Stop producing further items. Idempotent. Closing either side of a
    /// merge's two streams terminates the whole pipeline.
    fn close(&mut self);
}

/// Filter on `h.id` plus an optional extra predicate, used by the ancestor
/// walker to decide which traversed items are actually yielded.
#[derive(Clone)]
pub struct Selector {
    pub id: ItemId,
    pub predicate: Option<Arc<dyn Fn(&Item) -> bool + Send + Sync>>,
}

impl Selector {
    pub fn for_id(id: ItemId) -> Self { Self { id, predicate: None } }

    pub fn with_predicate(id: ItemId, predicate: Arc<dyn Fn(&Item) -> bool + Send + Sync>) -> Self {
        Self { id, predicate: Some(predicate) }
    }

    pub fn matches(&self, item: &Item) -> bool { item.h.id == self.id && self.predicate.as_ref().map_or(true, |p| p(item)) }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector").field("id", &self.id).field("predicate", &self.predicate.is_some()).finish()
    }
}

/// A bound handle over one `(id, perspective)` pair within a `Store`: the
/// `treeX`/`treeY` argument `Merger::merge` consumes.
pub struct Tree<S: Store> {
    store: Arc<S>,
    selector: Selector,
    perspective: PerspectiveId,
}

impl<S: Store> Tree<S> {
    pub fn new(store: Arc<S>, selector: Selector, perspective: PerspectiveId) -> Self { Self { store, selector, perspective } }

    pub fn perspective(&self) -> &PerspectiveId { &self.perspective }

    pub async fn get_by_version(&self, v: &Version) -> Result<Option<Item>, ReconcileError> {
        self.store.get_by_version(&self.selector.id, &self.perspective, v).await
    }

    /// Open an ancestor walker starting at `from`'s parents (proper
    /// ancestors only; `from` itself is not re-yielded).
    pub fn walk(&self, from: &Item) -> crate::walker::AncestorWalker<S> {
        crate::walker::AncestorWalker::new(self.store.clone(), self.selector.clone(), self.perspective.clone(), from.h.pa.clone())
    }

    /// Open an ancestor walker starting at an explicit frontier of parent
    /// versions -- used for virtual (unpersisted) heads, whose parents seed
    /// the frontier directly rather than smuggling a synthetic item into
    /// the stream.
    pub fn walk_from_versions(&self, versions: Vec<Version>) -> crate::walker::AncestorWalker<S> {
        crate::walker::AncestorWalker::new(self.store.clone(), self.selector.clone(), self.perspective.clone(), versions)
    }
}
