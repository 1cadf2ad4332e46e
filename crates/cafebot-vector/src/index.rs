use std::path::Path;

use tracing::{debug, info, warn};

use cafebot_core::error::{Error, Result};
use cafebot_core::types::{DocMeta, Ordinal};

use crate::persist::{self, IndexMetadata};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    Unbuilt,
    Built,
    Saved,
    Loaded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    pub score: f32,
    pub ordinal: Ordinal,
    pub meta: DocMeta,
}

/// Exact inner-product index over unit vectors, one per document ordinal.
///
/// Built wholesale; a rejected build leaves the previous contents in place.
pub struct VectorIndex {
    dim: usize,
    state: IndexState,
    vectors: Vec<Vec<f32>>,
    metas: Vec<DocMeta>,
    content_hash: Option<String>,
}

impl VectorIndex {
    pub fn new(dim: usize) -> Self {
        Self { dim, state: IndexState::Unbuilt, vectors: Vec::new(), metas: Vec::new(), content_hash: None }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn state(&self) -> IndexState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn metas(&self) -> &[DocMeta] {
        &self.metas
    }

    /// Stored vectors in ordinal order.
    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    /// Digest of the corpus the vectors were built from, when known.
    pub fn content_hash(&self) -> Option<&str> {
        self.content_hash.as_deref()
    }

    pub fn set_content_hash(&mut self, hash: impl Into<String>) {
        self.content_hash = Some(hash.into());
    }

    pub fn build(&mut self, vectors: Vec<Vec<f32>>, metas: Vec<DocMeta>) -> Result<()> {
        if vectors.len() != metas.len() {
            return Err(Error::DimensionMismatch(format!(
                "{} vectors but {} metadata records",
                vectors.len(),
                metas.len()
            )));
        }
        if vectors.is_empty() {
            return Err(Error::EmptyStore);
        }
        if let Some((ordinal, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != self.dim) {
            return Err(Error::DimensionMismatch(format!(
                "vector {ordinal} has dimension {}, index expects {}",
                v.len(),
                self.dim
            )));
        }
        self.vectors = vectors;
        self.metas = metas;
        self.content_hash = None;
        self.state = IndexState::Built;
        info!(count = self.vectors.len(), dim = self.dim, "vector index built");
        Ok(())
    }

    /// Top `top_k` documents by inner product with `query`, best first; equal
    /// scores rank by ordinal.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<VectorHit>> {
        if self.state == IndexState::Unbuilt {
            return Err(Error::NotBuilt);
        }
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch(format!(
                "query has dimension {}, index expects {}",
                query.len(),
                self.dim
            )));
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let mut scored: Vec<(Ordinal, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(ordinal, v)| (ordinal, dot(query, v)))
            .filter(|(_, s)| s.is_finite())
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(top_k);
        debug!(hits = scored.len(), top = scored.first().map(|h| h.1), "dense search");
        Ok(scored
            .into_iter()
            .map(|(ordinal, score)| VectorHit { score, ordinal, meta: self.metas[ordinal].clone() })
            .collect())
    }

    /// Persists vectors and metadata under `dir`, replacing any previous save.
    pub fn save(&mut self, dir: &Path) -> Result<()> {
        if self.state == IndexState::Unbuilt {
            return Err(Error::NotBuilt);
        }
        std::fs::create_dir_all(dir)?;
        let meta_path = dir.join(crate::schema::META_FILE);
        if meta_path.exists() {
            std::fs::remove_file(&meta_path)?;
        }
        let rt = persist::runtime()?;
        rt.block_on(persist::write_vectors(dir, &self.vectors, self.dim)).map_err(Error::Storage)?;
        let meta = IndexMetadata {
            dim: self.dim,
            count: self.vectors.len(),
            content_hash: self.content_hash.clone().unwrap_or_default(),
            built_at: chrono::Utc::now().to_rfc3339(),
            metas: self.metas.clone(),
        };
        persist::write_metadata(dir, &meta)?;
        self.state = IndexState::Saved;
        info!(dir = %dir.display(), count = meta.count, "vector index saved");
        Ok(())
    }

    /// Restores an index saved under `dir`. Both halves must exist and agree
    /// with each other and with `dim`.
    pub fn load(dir: &Path, dim: usize) -> Result<Self> {
        persist::ensure_complete(dir)?;
        let meta = persist::read_metadata(dir)?;
        if meta.dim != dim {
            return Err(Error::DimensionMismatch(format!("saved index has dimension {}, expected {dim}", meta.dim)));
        }
        if meta.count != meta.metas.len() {
            return Err(Error::DimensionMismatch(format!(
                "metadata declares {} entries but lists {}",
                meta.count,
                meta.metas.len()
            )));
        }
        let rt = persist::runtime()?;
        let rows = rt.block_on(persist::read_vectors(dir)).map_err(Error::Storage)?;
        if rows.len() != meta.count {
            return Err(Error::DimensionMismatch(format!(
                "{} stored vectors but {} metadata records",
                rows.len(),
                meta.count
            )));
        }

        let mut slots: Vec<Option<Vec<f32>>> = vec![None; meta.count];
        for (ordinal, vector) in rows {
            let slot = usize::try_from(ordinal)
                .ok()
                .and_then(|o| slots.get_mut(o))
                .ok_or_else(|| Error::Storage(anyhow::anyhow!("stored ordinal {ordinal} out of range")))?;
            if vector.len() != dim {
                return Err(Error::DimensionMismatch(format!(
                    "stored vector {ordinal} has dimension {}, expected {dim}",
                    vector.len()
                )));
            }
            *slot = Some(vector);
        }
        let vectors = slots
            .into_iter()
            .enumerate()
            .map(|(ordinal, v)| v.ok_or_else(|| Error::Storage(anyhow::anyhow!("ordinal {ordinal} missing from stored vectors"))))
            .collect::<Result<Vec<_>>>()?;

        info!(dir = %dir.display(), count = vectors.len(), built_at = %meta.built_at, "vector index loaded");
        Ok(Self {
            dim,
            state: IndexState::Loaded,
            vectors,
            metas: meta.metas,
            content_hash: Some(meta.content_hash),
        })
    }

    /// Like [`VectorIndex::load`], but rejects an index built from different texts.
    pub fn load_checked(dir: &Path, dim: usize, expected_hash: &str) -> Result<Self> {
        let index = Self::load(dir, dim)?;
        match index.content_hash() {
            Some(hash) if hash == expected_hash => Ok(index),
            other => {
                warn!(dir = %dir.display(), saved = ?other, "saved index does not match the document store");
                Err(Error::StaleIndex(dir.display().to_string()))
            }
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
