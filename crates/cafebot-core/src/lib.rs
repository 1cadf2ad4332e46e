//! cafebot-core
//!
//! Domain types, error taxonomy, configuration and the ordered document store
//! shared by the text, vector, hybrid and recommendation crates. Every index in
//! the workspace is keyed by a document's ordinal in [`store::DocumentStore`].

pub mod chunking;
pub mod config;
pub mod error;
pub mod feedback;
pub mod loader;
pub mod store;
pub mod traits;
pub mod types;
