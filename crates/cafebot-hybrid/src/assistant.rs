use std::sync::Arc;

use tracing::{debug, info};

use cafebot_core::config::RetrievalSettings;
use cafebot_core::error::{Error, Result};
use cafebot_core::traits::Generator;
use cafebot_core::types::{Candidate, DocMeta};

use crate::context::{build_context, craft_prompt};
use crate::rerank::Reranker;
use crate::retriever::HybridRetriever;

pub const NO_RESULTS_ANSWER: &str = "Sorry, I couldn't find relevant information.";

#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    /// Metadata of the documents rendered into the prompt, best first.
    pub context: Vec<DocMeta>,
    /// Reranked candidates, best first.
    pub sources: Vec<Candidate>,
}

/// Per-query question answering: retrieve, rerank, prompt, generate.
pub struct Assistant {
    retriever: Arc<HybridRetriever>,
    reranker: Reranker,
    generator: Box<dyn Generator>,
    settings: RetrievalSettings,
}

impl Assistant {
    pub fn new(
        retriever: Arc<HybridRetriever>,
        reranker: Reranker,
        generator: Box<dyn Generator>,
        settings: RetrievalSettings,
    ) -> Self {
        Self { retriever, reranker, generator, settings }
    }

    pub fn retriever(&self) -> &Arc<HybridRetriever> {
        &self.retriever
    }

    pub fn answer(&self, query: &str, user_pref: Option<&str>) -> Result<Answer> {
        let s = &self.settings;
        let candidates = self.retriever.hybrid_search(query, s.k, s.alpha)?;
        if candidates.is_empty() {
            info!(query, "no candidates");
            return Ok(Answer { text: NO_RESULTS_ANSWER.to_string(), context: Vec::new(), sources: Vec::new() });
        }

        let store = self.retriever.store();
        let head = &candidates[..candidates.len().min(s.rerank_top)];
        let reranked = self.reranker.rerank(query, head, store)?;

        let context_docs = &reranked[..reranked.len().min(s.context_docs)];
        let context = build_context(context_docs, store, s.context_docs);
        let prompt = craft_prompt(query, &context, user_pref);
        debug!(prompt_chars = prompt.len(), context_docs = context_docs.len(), "prompt ready");

        let text = self.generator.generate(&prompt).map_err(Error::Collaborator)?;
        let context = context_docs
            .iter()
            .filter_map(|c| store.get(c.ordinal))
            .map(|doc| doc.meta.clone())
            .collect();
        Ok(Answer { text: text.trim().to_string(), context, sources: reranked })
    }
}
