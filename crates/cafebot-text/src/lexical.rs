//! TF-IDF lexical index.
//!
//! Weighting follows the usual smoothed scheme: raw term counts times
//! `ln((1 + n) / (1 + df)) + 1`, rows L2-normalized, so a dot product between
//! a query row and a document row is their cosine similarity. When the corpus
//! has more distinct terms than `max_features`, the most frequent terms across
//! the corpus are kept (ties by term). The fit is frozen after construction.

use std::collections::HashMap;

use tantivy::tokenizer::TextAnalyzer;
use tracing::{debug, info};

use cafebot_core::error::{Error, Result};
use cafebot_core::types::{Ordinal, SearchHit, SourceKind};

use crate::tantivy_utils::{analyze, build_analyzer, unigrams_and_bigrams};

pub struct LexicalIndex {
    analyzer: TextAnalyzer,
    vocabulary: HashMap<String, u32>,
    idf: Vec<f32>,
    /// term id -> (ordinal, normalized weight)
    postings: Vec<Vec<(Ordinal, f32)>>,
    num_docs: usize,
}

impl LexicalIndex {
    /// Fits the term-weighting model over `texts`, one row per ordinal.
    pub fn fit(texts: &[String], max_features: usize) -> Result<Self> {
        if texts.is_empty() {
            return Err(Error::EmptyStore);
        }
        if max_features == 0 {
            return Err(Error::InvalidConfig("lexical max_features must be positive".to_string()));
        }
        let mut analyzer = build_analyzer();

        let doc_counts: Vec<HashMap<String, u32>> =
            texts.iter().map(|t| count_terms(&mut analyzer, t)).collect();

        let mut corpus_tf: HashMap<&str, u64> = HashMap::new();
        let mut df: HashMap<&str, u32> = HashMap::new();
        for counts in &doc_counts {
            for (term, &c) in counts {
                *corpus_tf.entry(term.as_str()).or_insert(0) += u64::from(c);
                *df.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let mut terms: Vec<&str> = corpus_tf.keys().copied().collect();
        if terms.len() > max_features {
            terms.sort_by(|a, b| corpus_tf[b].cmp(&corpus_tf[a]).then_with(|| a.cmp(b)));
            terms.truncate(max_features);
        }
        terms.sort_unstable();

        let n = texts.len() as f32;
        let vocabulary: HashMap<String, u32> =
            terms.iter().enumerate().map(|(id, t)| ((*t).to_string(), id as u32)).collect();
        let idf: Vec<f32> = terms
            .iter()
            .map(|t| ((1.0 + n) / (1.0 + df[t] as f32)).ln() + 1.0)
            .collect();

        let mut postings: Vec<Vec<(Ordinal, f32)>> = vec![Vec::new(); terms.len()];
        for (ordinal, counts) in doc_counts.iter().enumerate() {
            for (term_id, weight) in weigh(counts, &vocabulary, &idf) {
                postings[term_id as usize].push((ordinal, weight));
            }
        }

        info!(documents = texts.len(), vocabulary = terms.len(), "lexical index fitted");
        Ok(Self { analyzer, vocabulary, idf, postings, num_docs: texts.len() })
    }

    /// Number of indexed documents; equals the store length it was fitted on.
    pub fn len(&self) -> usize {
        self.num_docs
    }

    pub fn is_empty(&self) -> bool {
        self.num_docs == 0
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    /// Cosine similarity of `query` against every document. Only strictly
    /// positive scores are returned, best first (ties by ordinal), at most `top_k`.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let mut analyzer = self.analyzer.clone();
        let counts = count_terms(&mut analyzer, query);
        let query_row = weigh(&counts, &self.vocabulary, &self.idf);
        if query_row.is_empty() {
            debug!(query, "query has no in-vocabulary terms");
            return Ok(Vec::new());
        }

        let mut scores = vec![0.0f32; self.num_docs];
        for (term_id, q_weight) in query_row {
            for &(ordinal, d_weight) in &self.postings[term_id as usize] {
                scores[ordinal] += q_weight * d_weight;
            }
        }

        let mut hits: Vec<SearchHit> = scores
            .into_iter()
            .enumerate()
            .filter(|(_, s)| *s > 0.0)
            .map(|(ordinal, score)| SearchHit { ordinal, score, source: SourceKind::Text })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.ordinal.cmp(&b.ordinal)));
        hits.truncate(top_k);
        Ok(hits)
    }
}

fn count_terms(analyzer: &mut TextAnalyzer, text: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for term in unigrams_and_bigrams(&analyze(analyzer, text)) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

/// TF-IDF row for `counts`, restricted to the vocabulary and L2-normalized.
/// Empty when no term is in the vocabulary.
fn weigh(counts: &HashMap<String, u32>, vocabulary: &HashMap<String, u32>, idf: &[f32]) -> Vec<(u32, f32)> {
    let mut row: Vec<(u32, f32)> = counts
        .iter()
        .filter_map(|(term, &c)| vocabulary.get(term).map(|&id| (id, c as f32 * idf[id as usize])))
        .collect();
    let norm = row.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
    if norm == 0.0 {
        return Vec::new();
    }
    for (_, w) in &mut row {
        *w /= norm;
    }
    row.sort_unstable_by_key(|(id, _)| *id);
    row
}
