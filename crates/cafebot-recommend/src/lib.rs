//! Item recommendations: semantic match to a free-text preference blended
//! with popularity and rating.

use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, info};

use cafebot_core::config::RecommendSettings;
use cafebot_core::error::{Error, Result};
use cafebot_core::store::DocumentStore;
use cafebot_core::traits::Embedder;
use cafebot_core::types::{DocMeta, Ordinal};
use cafebot_embed::{embed_in_batches, l2_normalize};

/// Independent weights of similarity, popularity and rating. They need not
/// sum to one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
}

impl Default for Weights {
    fn default() -> Self {
        Self { alpha: 0.5, beta: 0.3, gamma: 0.2 }
    }
}

impl From<&RecommendSettings> for Weights {
    fn from(s: &RecommendSettings) -> Self {
        Self { alpha: s.alpha, beta: s.beta, gamma: s.gamma }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub ordinal: Ordinal,
    pub score: f32,
    pub similarity: f32,
    pub meta: DocMeta,
}

pub struct RecommendationScorer {
    store: Arc<DocumentStore>,
    embedder: Arc<dyn Embedder>,
    embeddings: Vec<Vec<f32>>,
    pop_norm: Vec<f32>,
    rating_norm: Vec<f32>,
}

impl RecommendationScorer {
    /// Embeds every document of `store` and caches the normalized signals.
    pub fn new(store: Arc<DocumentStore>, embedder: Arc<dyn Embedder>, batch_size: usize) -> Result<Self> {
        if store.is_empty() {
            return Err(Error::EmptyStore);
        }
        let embeddings = embed_in_batches(embedder.as_ref(), &store.texts(), batch_size)?;
        Self::with_embeddings(store, embedder, embeddings)
    }

    /// Reuses document embeddings computed elsewhere, e.g. a vector index's rows.
    pub fn with_embeddings(
        store: Arc<DocumentStore>,
        embedder: Arc<dyn Embedder>,
        mut embeddings: Vec<Vec<f32>>,
    ) -> Result<Self> {
        if store.is_empty() {
            return Err(Error::EmptyStore);
        }
        if embeddings.len() != store.len() {
            return Err(Error::DimensionMismatch(format!(
                "{} embeddings for {} documents",
                embeddings.len(),
                store.len()
            )));
        }
        let dim = embedder.dim();
        for (ordinal, v) in embeddings.iter_mut().enumerate() {
            if v.len() != dim {
                return Err(Error::DimensionMismatch(format!(
                    "embedding {ordinal} has dimension {}, embedder produces {dim}",
                    v.len()
                )));
            }
            l2_normalize(v);
        }

        let docs = store.documents();
        let pop: Vec<f32> = docs.iter().map(|d| d.meta.num_orders() as f32).collect();
        let rating: Vec<f32> = docs.iter().map(|d| d.meta.avg_rating()).collect();
        info!(documents = docs.len(), dim, "recommendation scorer ready");
        Ok(Self { store, embedder, embeddings, pop_norm: min_max(&pop), rating_norm: min_max(&rating) })
    }

    pub fn pop_norm(&self) -> &[f32] {
        &self.pop_norm
    }

    pub fn rating_norm(&self) -> &[f32] {
        &self.rating_norm
    }

    /// Top `k` documents by `alpha * similarity + beta * pop_norm + gamma * rating_norm`,
    /// best first; equal scores rank by ordinal.
    pub fn recommend(&self, preference: &str, k: usize, weights: Weights) -> Result<Vec<Recommendation>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let mut vectors = self.embedder.embed_batch(&[preference.to_string()]).map_err(Error::Collaborator)?;
        if vectors.len() != 1 {
            return Err(Error::Collaborator(anyhow!("embedder returned {} vectors for one preference", vectors.len())));
        }
        let mut query = vectors.remove(0);
        if query.len() != self.embedder.dim() {
            return Err(Error::DimensionMismatch(format!(
                "preference embedding has dimension {}, expected {}",
                query.len(),
                self.embedder.dim()
            )));
        }
        l2_normalize(&mut query);

        let Weights { alpha, beta, gamma } = weights;
        let mut scored: Vec<(Ordinal, f32, f32)> = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(ordinal, v)| {
                let sim: f32 = v.iter().zip(&query).map(|(a, b)| a * b).sum();
                let score = alpha * sim + beta * self.pop_norm[ordinal] + gamma * self.rating_norm[ordinal];
                (ordinal, score, sim)
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);
        debug!(preference, returned = scored.len(), top = scored.first().map(|s| s.1), "recommend");

        Ok(scored
            .into_iter()
            .filter_map(|(ordinal, score, similarity)| {
                self.store
                    .get(ordinal)
                    .map(|doc| Recommendation { ordinal, score, similarity, meta: doc.meta.clone() })
            })
            .collect())
    }
}

/// Min-max scaling to `[0, 1]`. A constant (or empty) input maps to all zeros.
pub fn min_max(values: &[f32]) -> Vec<f32> {
    let (lo, hi) = values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = hi - lo;
    if range <= 0.0 || !range.is_finite() {
        return vec![0.0; values.len()];
    }
    values.iter().map(|&v| ((v - lo) / range).clamp(0.0, 1.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::min_max;

    #[test]
    fn min_max_bounds() {
        assert_eq!(min_max(&[2.0, 4.0, 3.0]), vec![0.0, 1.0, 0.5]);
        assert_eq!(min_max(&[7.0, 7.0]), vec![0.0, 0.0]);
        assert!(min_max(&[]).is_empty());
    }
}
