//! Error taxonomy for the reconciliation engine.
//!
//! Every variant here aborts the in-flight operation immediately; the core
//! never retries on its own and never logs at warning level or above --
//! callers that want that get it from their own `tracing` subscriber.

use perspectivedb_proto::{ItemId, Version};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Bad inputs: missing ids/versions, mismatched arguments. Synchronous,
    /// caller bug, never worth retrying.
    #[error("argument error: {0}")]
    ArgumentError(String),

    /// Two items claim different logical ids in the same merge.
    #[error("id mismatch: {x} != {y}")]
    IdMismatch { x: ItemId, y: ItemId },

    /// An item that should carry a persisted version does not.
    #[error("item {0} has no version")]
    MissingVersion(ItemId),

    /// The two roots' DAGs share no common ancestor.
    #[error("no common ancestor between the two roots")]
    NoLcaFound,

    /// An LCA version was identified but the store could not return it.
    #[error("lca version {0} could not be resolved from the store")]
    LcaUnresolvable(Version),

    /// Internal invariant violation: the folded LCA pair disagreed on
    /// version. Should never happen; surfaced rather than panicking.
    #[error("lca version mismatch: {x} != {y}")]
    LcaVersionMismatch { x: Version, y: Version },

    /// Recoverable: attribute-level conflicts a human (or policy layer
    /// outside the core) must resolve.
    #[error("merge conflict on attributes: {conflict:?}")]
    MergeConflict { conflict: Vec<String> },

    /// Pass-through from the backing store.
    #[error("store I/O error: {0}")]
    StoreIoError(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl ReconcileError {
    pub fn store_io(err: impl std::error::Error + Send + Sync + 'static) -> Self { ReconcileError::StoreIoError(Box::new(err)) }
}
