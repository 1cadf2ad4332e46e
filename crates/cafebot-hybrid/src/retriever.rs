use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, info, warn};

use cafebot_core::config::Settings;
use cafebot_core::error::{Error, Result};
use cafebot_core::store::DocumentStore;
use cafebot_core::traits::Embedder;
use cafebot_core::types::{Candidate, SearchHit, SourceKind};
use cafebot_embed::{embed_in_batches, l2_normalize};
use cafebot_text::LexicalIndex;
use cafebot_vector::{content_hash, VectorIndex};

use crate::fusion::{fuse, OVERFETCH_FACTOR};

/// Dense + sparse retrieval over one document store.
///
/// Both indexes are aligned with the store by ordinal and the vector index
/// carries the store's metadata; [`HybridRetriever::new`] refuses any other
/// combination.
pub struct HybridRetriever {
    store: Arc<DocumentStore>,
    vector: VectorIndex,
    lexical: LexicalIndex,
    embedder: Arc<dyn Embedder>,
}

impl HybridRetriever {
    pub fn new(
        store: Arc<DocumentStore>,
        vector: VectorIndex,
        lexical: LexicalIndex,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        if vector.len() != store.len() || lexical.len() != store.len() {
            return Err(Error::Misaligned { documents: store.len(), vectors: vector.len(), lexical: lexical.len() });
        }
        if let Some(ordinal) = vector.metas().iter().zip(store.metas()).position(|(indexed, current)| *indexed != current) {
            return Err(Error::StaleIndex(format!("metadata of document {ordinal} differs from the store")));
        }
        if embedder.dim() != vector.dim() {
            return Err(Error::DimensionMismatch(format!(
                "embedder dimension {} differs from index dimension {}",
                embedder.dim(),
                vector.dim()
            )));
        }
        Ok(Self { store, vector, lexical, embedder })
    }

    /// Embeds every document and fits both indexes from scratch.
    pub fn build(store: Arc<DocumentStore>, embedder: Arc<dyn Embedder>, settings: &Settings) -> Result<Self> {
        let texts = store.texts();
        info!(documents = texts.len(), "building indexes");
        let vectors = embed_in_batches(embedder.as_ref(), &texts, settings.embedding.batch_size)?;
        let mut vector = VectorIndex::new(embedder.dim());
        vector.build(vectors, store.metas())?;
        vector.set_content_hash(content_hash(&texts));
        let lexical = LexicalIndex::fit(&texts, settings.lexical.max_features)?;
        Self::new(store, vector, lexical, embedder)
    }

    /// Restores the vector index saved under `index_dir` and refits the lexical
    /// index. Fails with `StaleIndex` when the saved index was built from other
    /// texts or carries other metadata (e.g. changed order statistics).
    pub fn from_saved(
        store: Arc<DocumentStore>,
        embedder: Arc<dyn Embedder>,
        index_dir: &Path,
        settings: &Settings,
    ) -> Result<Self> {
        let texts = store.texts();
        let vector = VectorIndex::load_checked(index_dir, embedder.dim(), &content_hash(&texts))?;
        let lexical = LexicalIndex::fit(&texts, settings.lexical.max_features)?;
        Self::new(store, vector, lexical, embedder)
    }

    /// Reuses a matching saved index, otherwise builds one and saves it.
    pub fn load_or_build(
        store: Arc<DocumentStore>,
        embedder: Arc<dyn Embedder>,
        index_dir: &Path,
        settings: &Settings,
    ) -> Result<Self> {
        match Self::from_saved(store.clone(), embedder.clone(), index_dir, settings) {
            Ok(retriever) => Ok(retriever),
            Err(e @ (Error::NotFound(_) | Error::StaleIndex(_) | Error::DimensionMismatch(_) | Error::Storage(_))) => {
                warn!(error = %e, "saved index unusable, rebuilding");
                let mut retriever = Self::build(store, embedder, settings)?;
                retriever.save(index_dir)?;
                Ok(retriever)
            }
            Err(e) => Err(e),
        }
    }

    pub fn save(&mut self, index_dir: &Path) -> Result<()> {
        self.vector.save(index_dir)
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    pub fn vector_index(&self) -> &VectorIndex {
        &self.vector
    }

    pub fn lexical_index(&self) -> &LexicalIndex {
        &self.lexical
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embedder.embed_batch(&[query.to_string()]).map_err(Error::Collaborator)?;
        if vectors.len() != 1 {
            return Err(Error::Collaborator(anyhow!("embedder returned {} vectors for one query", vectors.len())));
        }
        let mut v = vectors.remove(0);
        l2_normalize(&mut v);
        Ok(v)
    }

    pub fn dense_search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        let q = self.embed_query(query)?;
        Ok(self
            .vector
            .search(&q, top_k)?
            .into_iter()
            .map(|h| SearchHit { ordinal: h.ordinal, score: h.score, source: SourceKind::Vector })
            .collect())
    }

    pub fn sparse_search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        self.lexical.search(query, top_k)
    }

    /// Top `k` fused candidates for `query`; `alpha` weights the dense score.
    pub fn hybrid_search(&self, query: &str, k: usize, alpha: f32) -> Result<Vec<Candidate>> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(Error::InvalidConfig(format!("alpha must lie in [0, 1], got {alpha}")));
        }
        if k == 0 {
            return Ok(Vec::new());
        }
        let fetch = k.saturating_mul(OVERFETCH_FACTOR);
        let dense = self.dense_search(query, fetch)?;
        let sparse = self.sparse_search(query, fetch)?;
        let fused = fuse(&dense, &sparse, alpha, k);
        debug!(
            dense = dense.len(),
            sparse = sparse.len(),
            fused = fused.len(),
            top = fused.first().map(|c| c.fused_score),
            "hybrid search"
        );
        Ok(fused)
    }
}
