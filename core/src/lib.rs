//! Version reconciliation engine for PerspectiveDB.
//!
//! Consumes a backing [`Store`] through the [`Tree`]/[`ItemStream`] traits
//! and exposes two entry points: [`find_lcas`] for locating the lowest
//! common ancestors of two DAG roots, and [`Merger::merge`] for turning two
//! divergent versions into a reconciled pair. Ingestion, transport,
//! authentication, and persistence are external collaborators; this crate
//! only ever reads from a store, never writes to one.

pub mod body_merge;
pub mod concat_stream;
pub mod error;
pub mod lca;
pub mod merger;
pub mod traits;
pub mod walker;

#[cfg(test)]
pub(crate) mod test_support;

pub use body_merge::three_way_merge;
pub use concat_stream::{ConcatStream, StreamSource, VirtualHeadSource, WalkerSource};
pub use error::ReconcileError;
pub use lca::{find_lcas, HasVersion, LcaOutcome};
pub use merger::{MergeState, Merger};
pub use traits::{ItemCursor, ItemStream, Selector, Store, Tree};
pub use walker::AncestorWalker;

pub use perspectivedb_proto as proto;
