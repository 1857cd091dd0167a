//! Concatenated / virtual-head stream: compose an ordered sequence of item streams into one.

use std::sync::Arc;

use async_trait::async_trait;
use perspectivedb_proto::{Item, PerspectiveId, Version};

use crate::error::ReconcileError;
use crate::traits::{ItemStream, Selector, Store};
use crate::walker::AncestorWalker;

/// Something that can be (re)opened into a fresh [`ItemStream`]. Storing
/// factories rather than opened streams is what lets [`ConcatStream::reopen`]
/// rebuild an equivalent concatenation for a second traversal pass.
pub trait StreamSource: Send + Sync {
    fn open(&self) -> Box<dyn ItemStream>;
}

/// A one-element source that yields a single (typically virtual, unpersisted)
/// item and then ends. Prepending this in front of an ancestor walker lets
/// the LCA finder treat an in-flight, not-yet-inserted merge as just another
/// root.
pub struct VirtualHeadSource(Item);

impl VirtualHeadSource {
    pub fn new(item: Item) -> Self { Self(item) }
}

impl StreamSource for VirtualHeadSource {
    fn open(&self) -> Box<dyn ItemStream> { Box::new(SingleItemStream { item: Some(self.0.clone()) }) }
}

struct SingleItemStream {
    item: Option<Item>,
}

#[async_trait]
impl ItemStream for SingleItemStream {
    async fn next(&mut self) -> Result<Option<Item>, ReconcileError> { Ok(self.item.take()) }

    fn close(&mut self) { self.item = None; }
}

/// Re-openable source backed by a [`Store`]: constructs a fresh
/// [`AncestorWalker`] each time it is opened, so it can be the tail of a
/// [`ConcatStream`] that gets `reopen()`-ed for a second pass.
pub struct WalkerSource<S: Store> {
    store: Arc<S>,
    selector: Selector,
    perspective: PerspectiveId,
    start: Vec<Version>,
}

impl<S: Store + 'static> WalkerSource<S> {
    pub fn new(store: Arc<S>, selector: Selector, perspective: PerspectiveId, start: Vec<Version>) -> Self {
        Self { store, selector, perspective, start }
    }
}

impl<S: Store + 'static> StreamSource for WalkerSource<S> {
    fn open(&self) -> Box<dyn ItemStream> {
        Box::new(AncestorWalker::new(self.store.clone(), self.selector.clone(), self.perspective.clone(), self.start.clone()))
    }
}

/// Concatenates an ordered sequence of stream sources into one stream:
/// drains the first until it ends, then the second, and so on.
pub struct ConcatStream {
    sources: Vec<Arc<dyn StreamSource>>,
    idx: usize,
    current: Option<Box<dyn ItemStream>>,
    closed: bool,
}

impl ConcatStream {
    pub fn new(sources: Vec<Arc<dyn StreamSource>>) -> Self { Self { sources, idx: 0, current: None, closed: false } }

    /// Convenience constructor for the common case: a virtual head in front
    /// of a single re-openable tail source.
    pub fn with_virtual_head(head: Item, tail: Arc<dyn StreamSource>) -> Self {
        Self::new(vec![Arc::new(VirtualHeadSource::new(head)), tail])
    }

    /// Rebuild an equivalent fresh concatenation from the same sources,
    /// for Merger's second pass over the same ancestor traversal during
    /// recursive LCA folding.
    pub fn reopen(&self) -> ConcatStream { ConcatStream::new(self.sources.clone()) }
}

#[async_trait]
impl ItemStream for ConcatStream {
    async fn next(&mut self) -> Result<Option<Item>, ReconcileError> {
        if self.closed {
            return Ok(None);
        }
        loop {
            if self.current.is_none() {
                if self.idx >= self.sources.len() {
                    return Ok(None);
                }
                self.current = Some(self.sources[self.idx].open());
                self.idx += 1;
            }
            let stream = self.current.as_mut().expect("just opened");
            match stream.next().await? {
                Some(item) => return Ok(Some(item)),
                None => self.current = None,
            }
        }
    }

    fn close(&mut self) {
        self.closed = true;
        if let Some(stream) = &mut self.current {
            stream.close();
        }
    }
}
