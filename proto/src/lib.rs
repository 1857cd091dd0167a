//! Wire-agnostic data model for PerspectiveDB: the versioned item type the
//! reconciliation engine (`perspectivedb-core`) operates on.
//!
//! This crate does not prescribe a persistence or wire format; it only
//! defines the shapes described by the data model (versioned items, their
//! headers, and their opaque bodies) so that the engine and its callers
//! share typed values instead of duck-typed mappings.

pub mod error;
pub mod header;
pub mod id;
pub mod item;
pub mod perspective;
pub mod value;
pub mod version;

pub use error::DataError;
pub use header::Header;
pub use id::{ItemId, MAX_ITEM_ID_LEN};
pub use item::Item;
pub use perspective::PerspectiveId;
pub use value::{Body, OrderedFloat, Value};
pub use version::Version;
