//! Ancestor Walker: backward traversal of one perspective's DAG.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use perspectivedb_proto::{Item, PerspectiveId, Version};

use crate::error::ReconcileError;
use crate::traits::{ItemCursor, ItemStream, Selector, Store};

/// Walks backward from a frontier of versions, yielding each matching item
/// and replacing the frontier with its parents, until the frontier is
/// exhausted or the store's cursor runs dry.
///
/// The store's cursor is assumed to already enumerate items for this id in
/// a valid reverse-topological order; the walker's job is only to decide,
/// for each item the cursor produces, whether it is still a wanted ancestor
/// and whether it should be yielded.
pub struct AncestorWalker<S: Store> {
    store: Arc<S>,
    selector: Selector,
    perspective: PerspectiveId,
    frontier: BTreeSet<Version>,
    cursor: Option<Box<dyn ItemCursor>>,
    closed: bool,
}

impl<S: Store> AncestorWalker<S> {
    pub fn new(store: Arc<S>, selector: Selector, perspective: PerspectiveId, start: Vec<Version>) -> Self {
        Self { store, selector, perspective, frontier: start.into_iter().collect(), cursor: None, closed: false }
    }

    async fn cursor(&mut self) -> Result<&mut Box<dyn ItemCursor>, ReconcileError> {
        if self.cursor.is_none() {
            let cursor = self.store.scan(&self.selector.id, &self.perspective).await?;
            self.cursor = Some(cursor);
        }
        Ok(self.cursor.as_mut().expect("just initialized"))
    }
}

#[async_trait]
impl<S: Store> ItemStream for AncestorWalker<S> {
    #[tracing::instrument(level = "trace", skip(self))]
    async fn next(&mut self) -> Result<Option<Item>, ReconcileError> {
        if self.closed {
            return Ok(None);
        }

        loop {
            if self.frontier.is_empty() {
                return Ok(None);
            }

            let cursor = self.cursor().await?;
            let Some(item) = cursor.next().await? else {
                // Store exhausted before the frontier closed: the requested
                // heads were never found, so the stream simply ends.
                return Ok(None);
            };

            let Some(v) = item.h.v else {
                // Defensive: a persisted item always carries a version; a
                // store that yields a virtual item is misbehaving, skip it.
                continue;
            };

            if !self.frontier.remove(&v) {
                // Not one of the ancestors we're currently looking for.
                continue;
            }

            self.frontier.extend(item.h.pa.iter().copied());

            if self.selector.matches(&item) {
                tracing::trace!(version = %v, "yielding ancestor");
                return Ok(Some(item));
            }
            // Traversed but filtered out by the selector: keep going, its
            // parents are already queued above.
        }
    }

    fn close(&mut self) { self.closed = true; }
}
