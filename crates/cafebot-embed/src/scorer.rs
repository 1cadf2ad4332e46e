use std::collections::HashSet;

use anyhow::Result;

use cafebot_core::traits::PairwiseScorer;

/// Scores a pair by the fraction of query words present in the text.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalOverlapScorer;

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

impl PairwiseScorer for LexicalOverlapScorer {
    fn score_pairs(&self, pairs: &[(String, String)]) -> Result<Vec<f32>> {
        Ok(pairs
            .iter()
            .map(|(query, text)| {
                let query_words: Vec<String> = words(query).collect();
                if query_words.is_empty() {
                    return 0.0;
                }
                let text_words: HashSet<String> = words(text).collect();
                let hits = query_words.iter().filter(|w| text_words.contains(*w)).count();
                hits as f32 / query_words.len() as f32
            })
            .collect())
    }
}
