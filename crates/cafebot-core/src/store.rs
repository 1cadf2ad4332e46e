//! The ordered document store.
//!
//! Items come first in source order, then FAQ chunks in source order and
//! window order. A document's position is its [`Ordinal`], the join key used
//! by every index built on top of the store.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chunking::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::{DocMeta, Document, FaqMeta, ItemMeta, Ordinal};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRow {
    pub item_id: String,
    pub item_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqRow {
    pub question: String,
    pub answer: String,
}

/// Order statistics keyed by item id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStats {
    pub item_id: String,
    pub num_orders: u64,
    pub avg_rating: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentStore {
    documents: Vec<Document>,
}

impl DocumentStore {
    /// Assembles the store from in-memory tables.
    ///
    /// Items are left-joined against `orders` by id (first match wins; no
    /// match gives zero orders and a zero rating). FAQ question and answer are
    /// concatenated and split into windows by `chunking`.
    pub fn build(
        items: &[ItemRow],
        faqs: &[FaqRow],
        orders: &[OrderStats],
        chunking: &ChunkingConfig,
    ) -> Result<Self> {
        chunking.validate()?;

        let mut stats_by_id: HashMap<&str, &OrderStats> = HashMap::new();
        for row in orders {
            stats_by_id.entry(row.item_id.as_str()).or_insert(row);
        }

        let mut documents = Vec::with_capacity(items.len() + faqs.len());
        for item in items {
            let (num_orders, avg_rating) = stats_by_id
                .get(item.item_id.as_str())
                .map_or((0, 0.0), |s| (s.num_orders, s.avg_rating));
            documents.push(Document {
                id: format!("item_{}", item.item_id),
                text: item.item_name.clone(),
                meta: DocMeta::Item(ItemMeta {
                    item_id: item.item_id.clone(),
                    item_name: item.item_name.clone(),
                    num_orders,
                    avg_rating,
                }),
            });
        }

        for (position, faq) in faqs.iter().enumerate() {
            let parent_id = format!("faq_{position}");
            let text = format!("{} {}", faq.question, faq.answer);
            let meta = DocMeta::Faq(FaqMeta { question: faq.question.clone(), answer: faq.answer.clone() });
            let chunks = chunking.split(&text)?;
            let single = chunks.len() == 1;
            for (chunk_index, chunk) in chunks.into_iter().enumerate() {
                let id = if single { parent_id.clone() } else { format!("{parent_id}_{chunk_index}") };
                documents.push(Document { id, text: chunk, meta: meta.clone() });
            }
        }

        let store = Self::from_documents(documents)?;
        info!(
            documents = store.len(),
            items = items.len(),
            faqs = faqs.len(),
            "document store built"
        );
        Ok(store)
    }

    /// Wraps an already ordered document sequence.
    pub fn from_documents(documents: Vec<Document>) -> Result<Self> {
        if documents.is_empty() {
            return Err(Error::EmptyStore);
        }
        let mut seen = HashSet::with_capacity(documents.len());
        for doc in &documents {
            if !seen.insert(doc.id.as_str()) {
                return Err(Error::DuplicateId(doc.id.clone()));
            }
        }
        Ok(Self { documents })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Always `false` for a constructed store; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, ordinal: Ordinal) -> Option<&Document> {
        self.documents.get(ordinal)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn texts(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.text.clone()).collect()
    }

    pub fn metas(&self) -> Vec<DocMeta> {
        self.documents.iter().map(|d| d.meta.clone()).collect()
    }
}
