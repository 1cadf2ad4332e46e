//! Score-level fusion of dense and sparse hits.

use std::collections::{HashMap, HashSet};

use cafebot_core::types::{Candidate, Ordinal, SearchHit};

/// Each path is asked for this many times `k` hits before fusion.
pub const OVERFETCH_FACTOR: usize = 2;

/// Merges both hit lists by ordinal and ranks them by
/// `alpha * dense + (1 - alpha) * sparse`, a missing side counting as `0.0`.
///
/// Equal fused scores keep merge order: dense hits in dense rank order, then
/// sparse-only hits in sparse rank order. At most `k` candidates are returned.
pub fn fuse(dense: &[SearchHit], sparse: &[SearchHit], alpha: f32, k: usize) -> Vec<Candidate> {
    let mut merged: Vec<Candidate> = Vec::with_capacity(dense.len() + sparse.len());
    let mut slot: HashMap<Ordinal, usize> = HashMap::new();

    for hit in dense {
        if slot.contains_key(&hit.ordinal) {
            continue;
        }
        slot.insert(hit.ordinal, merged.len());
        merged.push(Candidate {
            ordinal: hit.ordinal,
            dense_score: hit.score,
            sparse_score: 0.0,
            fused_score: 0.0,
            rerank_score: None,
        });
    }
    let mut sparse_seen: HashSet<Ordinal> = HashSet::new();
    for hit in sparse {
        if !sparse_seen.insert(hit.ordinal) {
            continue;
        }
        match slot.get(&hit.ordinal) {
            Some(&i) => merged[i].sparse_score = hit.score,
            None => {
                slot.insert(hit.ordinal, merged.len());
                merged.push(Candidate {
                    ordinal: hit.ordinal,
                    dense_score: 0.0,
                    sparse_score: hit.score,
                    fused_score: 0.0,
                    rerank_score: None,
                });
            }
        }
    }

    let mut ranked: Vec<(usize, Candidate)> = merged
        .into_iter()
        .map(|mut c| {
            c.fused_score = alpha * c.dense_score + (1.0 - alpha) * c.sparse_score;
            c
        })
        .enumerate()
        .collect();
    ranked.sort_by(|(ia, a), (ib, b)| b.fused_score.total_cmp(&a.fused_score).then(ia.cmp(ib)));
    ranked.truncate(k);
    ranked.into_iter().map(|(_, c)| c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cafebot_core::types::SourceKind;

    fn hits(source: SourceKind, scored: &[(Ordinal, f32)]) -> Vec<SearchHit> {
        scored.iter().map(|&(ordinal, score)| SearchHit { ordinal, score, source }).collect()
    }

    #[test]
    fn repeated_ordinals_keep_first_score() {
        let dense = hits(SourceKind::Vector, &[(0, 0.9), (0, 0.1)]);
        let sparse = hits(SourceKind::Text, &[(0, 0.4), (0, 0.8)]);
        let fused = fuse(&dense, &sparse, 0.5, 5);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].dense_score, 0.9);
        assert_eq!(fused[0].sparse_score, 0.4);
    }

    #[test]
    fn equal_fused_scores_keep_merge_order() {
        let dense = hits(SourceKind::Vector, &[(4, 0.5), (2, 0.5)]);
        let sparse = hits(SourceKind::Text, &[(1, 0.5), (4, 0.5)]);
        // alpha 0.5: ordinal 4 -> 0.5, 2 -> 0.25, 1 -> 0.25
        let order: Vec<Ordinal> = fuse(&dense, &sparse, 0.5, 5).iter().map(|c| c.ordinal).collect();
        assert_eq!(order, vec![4, 2, 1]);
    }
}
