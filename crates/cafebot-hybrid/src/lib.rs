//! Hybrid retrieval and answering for cafebot.
//!
//! - [`HybridRetriever`]: dense + sparse search fused at score level
//! - [`Reranker`]: second pass through a pairwise scorer
//! - [`Assistant`]: retrieve, rerank, build the prompt, generate

pub mod assistant;
pub mod context;
pub mod fusion;
pub mod generator;
pub mod rerank;
pub mod retriever;

pub use assistant::{Answer, Assistant, NO_RESULTS_ANSWER};
pub use context::{build_context, craft_prompt};
pub use fusion::fuse;
pub use generator::ExtractiveGenerator;
pub use rerank::Reranker;
pub use retriever::HybridRetriever;
