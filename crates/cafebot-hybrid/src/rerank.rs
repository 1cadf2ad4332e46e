use anyhow::anyhow;
use tracing::debug;

use cafebot_core::error::{Error, Result};
use cafebot_core::store::DocumentStore;
use cafebot_core::traits::PairwiseScorer;
use cafebot_core::types::Candidate;

/// Second-pass ordering of fused candidates by a pairwise relevance scorer.
pub struct Reranker {
    scorer: Box<dyn PairwiseScorer>,
}

impl Reranker {
    pub fn new(scorer: Box<dyn PairwiseScorer>) -> Self {
        Self { scorer }
    }

    /// Scores every candidate against `query` in one scorer call and returns
    /// new candidates sorted by rerank score. Equal scores keep incoming order;
    /// non-finite scores are kept on the candidate but rank last.
    pub fn rerank(&self, query: &str, candidates: &[Candidate], store: &DocumentStore) -> Result<Vec<Candidate>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let pairs = candidates
            .iter()
            .map(|c| {
                store
                    .get(c.ordinal)
                    .map(|doc| (query.to_string(), doc.scoring_text().to_string()))
                    .ok_or_else(|| Error::NotFound(format!("document ordinal {}", c.ordinal)))
            })
            .collect::<Result<Vec<_>>>()?;

        let scores = self.scorer.score_pairs(&pairs).map_err(Error::Collaborator)?;
        if scores.len() != candidates.len() {
            return Err(Error::Collaborator(anyhow!(
                "scorer returned {} scores for {} pairs",
                scores.len(),
                candidates.len()
            )));
        }

        let mut ranked: Vec<(usize, Candidate)> = candidates
            .iter()
            .zip(scores)
            .map(|(c, s)| c.with_rerank_score(s))
            .enumerate()
            .collect();
        ranked.sort_by(|(ia, a), (ib, b)| {
            let sa = a.rerank_score.filter(|s| s.is_finite()).unwrap_or(f32::NEG_INFINITY);
            let sb = b.rerank_score.filter(|s| s.is_finite()).unwrap_or(f32::NEG_INFINITY);
            sb.total_cmp(&sa).then(ia.cmp(ib))
        });
        debug!(candidates = ranked.len(), top = ranked.first().and_then(|(_, c)| c.rerank_score), "reranked");
        Ok(ranked.into_iter().map(|(_, c)| c).collect())
    }
}
