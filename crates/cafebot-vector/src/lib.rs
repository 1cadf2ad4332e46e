//! Dense vector index for cafebot.
//!
//! Exact inner-product search in memory; persistence pairs a LanceDB table of
//! vectors with a JSON metadata file.

pub mod index;
pub mod persist;
pub mod schema;

pub use index::{IndexState, VectorHit, VectorIndex};
pub use persist::{content_hash, IndexMetadata};
