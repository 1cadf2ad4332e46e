//! Domain types shared by the document store, the indexes and the rankers.

use serde::{Deserialize, Serialize};

/// Position of a document in the store. Every index is keyed by it.
pub type Ordinal = usize;

/// Metadata of a menu item joined with its order statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMeta {
    pub item_id: String,
    pub item_name: String,
    pub num_orders: u64,
    pub avg_rating: f32,
}

/// Metadata of a FAQ entry. Shared by every chunk cut from the same entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqMeta {
    pub question: String,
    pub answer: String,
}

/// Per-document metadata, tagged by source.
///
/// Serialized with a `type` tag (`"item"` / `"faq"`) so persisted metadata and
/// feedback records stay readable by other tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocMeta {
    Item(ItemMeta),
    Faq(FaqMeta),
}

impl DocMeta {
    /// Popularity signal; FAQ entries have none.
    pub fn num_orders(&self) -> u64 {
        match self {
            DocMeta::Item(item) => item.num_orders,
            DocMeta::Faq(_) => 0,
        }
    }

    /// Rating signal; FAQ entries have none.
    pub fn avg_rating(&self) -> f32 {
        match self {
            DocMeta::Item(item) => item.avg_rating,
            DocMeta::Faq(_) => 0.0,
        }
    }

    /// Text used when a document carries no text of its own.
    pub fn fallback_text(&self) -> &str {
        match self {
            DocMeta::Item(item) => &item.item_name,
            DocMeta::Faq(faq) => &faq.answer,
        }
    }

    /// Display name for listings: the item name, or the FAQ question.
    pub fn title(&self) -> &str {
        match self {
            DocMeta::Item(item) => &item.item_name,
            DocMeta::Faq(faq) => &faq.question,
        }
    }
}

/// An immutable, independently indexed unit of text.
///
/// - `id`: unique across the store (`item_<id>`, `faq_<n>`, `faq_<n>_<chunk>`)
/// - `text`: the payload embedded and term-weighted by the indexes
/// - `meta`: structured source metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub meta: DocMeta,
}

impl Document {
    /// Text handed to the pairwise scorer: own text, else the meta fallback.
    pub fn scoring_text(&self) -> &str {
        if self.text.is_empty() {
            self.meta.fallback_text()
        } else {
            &self.text
        }
    }
}

/// Indicates which engine produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceKind {
    Vector,
    Text,
}

/// The minimal surface returned by both indexes.
///
/// `score` is engine-specific but higher is always better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub ordinal: Ordinal,
    pub score: f32,
    pub source: SourceKind,
}

/// A fused retrieval result, optionally carrying a second-pass score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub ordinal: Ordinal,
    pub dense_score: f32,
    pub sparse_score: f32,
    pub fused_score: f32,
    pub rerank_score: Option<f32>,
}

impl Candidate {
    /// Returns a copy carrying `score` as its rerank score.
    pub fn with_rerank_score(&self, score: f32) -> Self {
        Self { rerank_score: Some(score), ..self.clone() }
    }
}
