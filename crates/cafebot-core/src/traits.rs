//! Contracts of the external collaborators consumed by the pipeline.
//!
//! Implementations live outside the core (see `cafebot-embed` and
//! `cafebot-hybrid`); every component receives them as constructor arguments.

/// Maps texts to fixed-dimension unit vectors. Batched and order-preserving.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Scores `(query, text)` pairs. One score per pair, order-preserving.
pub trait PairwiseScorer: Send + Sync {
    fn score_pairs(&self, pairs: &[(String, String)]) -> anyhow::Result<Vec<f32>>;
}

/// Turns a prompt into an answer.
pub trait Generator: Send + Sync {
    fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}
