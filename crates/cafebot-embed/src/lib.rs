//! Embedding and pair-scoring backends for cafebot.
//!
//! Dense embedders implement [`cafebot_core::traits::Embedder`]; rerankers
//! implement [`cafebot_core::traits::PairwiseScorer`]. Model-backed variants run
//! on candle and load HuggingFace checkpoints from a local directory.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use cafebot_core::config::{EmbeddingBackend, EmbeddingSettings, RerankerBackend, RerankerSettings};
use cafebot_core::traits::{Embedder, PairwiseScorer};

pub mod batch;
pub mod cross_encoder;
pub mod device;
pub mod hashing;
pub mod model;
pub mod pool;
pub mod scorer;
pub mod tokenize;

pub use batch::{embed_in_batches, l2_normalize};
pub use cross_encoder::CrossEncoder;
pub use hashing::HashEmbedder;
pub use model::BgeM3Embedder;
pub use pool::masked_mean_l2;
pub use scorer::LexicalOverlapScorer;

/// Embedder selected by `settings.backend`; `model_dir` is the resolved checkpoint directory.
pub fn get_default_embedder(settings: &EmbeddingSettings, model_dir: &Path) -> Result<Arc<dyn Embedder>> {
    match settings.backend {
        EmbeddingBackend::Hash => {
            info!(dim = settings.dim, "using hash embedder");
            Ok(Arc::new(HashEmbedder::new(settings.dim)))
        }
        EmbeddingBackend::Bge => Ok(Arc::new(BgeM3Embedder::new(model_dir, settings.dim, settings.max_len)?)),
    }
}

pub fn get_default_scorer(settings: &RerankerSettings, model_dir: &Path) -> Result<Box<dyn PairwiseScorer>> {
    match settings.backend {
        RerankerBackend::Lexical => {
            info!("using lexical overlap reranker");
            Ok(Box::new(LexicalOverlapScorer))
        }
        RerankerBackend::CrossEncoder => Ok(Box::new(CrossEncoder::new(model_dir, settings.max_len)?)),
    }
}
