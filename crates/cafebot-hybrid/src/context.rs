//! Prompt assembly from reranked candidates.

use cafebot_core::store::DocumentStore;
use cafebot_core::types::{Candidate, DocMeta};

pub const CONTEXT_SEPARATOR: &str = "\n---\n";
pub const EMPTY_CONTEXT: &str = "No relevant context available.";

const INSTRUCTIONS: &str = "You are a friendly cafe assistant. Your task:\
- Always give a helpful explanation, not just a one-word reply.\
- Use complete sentences (2-5 sentences).\
- Base your answer on the context provided below.\
- If preferences are given, personalize the answer to match them.\
- If you are unsure, say so politely and suggest what the customer could try instead.";

/// Structured text of one document for the prompt.
pub fn context_entry(meta: &DocMeta) -> String {
    match meta {
        DocMeta::Faq(faq) => format!("FAQ: Q: {} A: {}", faq.question, faq.answer),
        DocMeta::Item(item) => {
            format!("Item: {} (orders: {}, rating: {})", item.item_name, item.num_orders, item.avg_rating)
        }
    }
}

/// Joins the entries of the first `limit` candidates that resolve in `store`.
pub fn build_context(candidates: &[Candidate], store: &DocumentStore, limit: usize) -> String {
    let entries: Vec<String> = candidates
        .iter()
        .take(limit)
        .filter_map(|c| store.get(c.ordinal))
        .map(|doc| context_entry(&doc.meta))
        .collect();
    if entries.is_empty() {
        EMPTY_CONTEXT.to_string()
    } else {
        entries.join(CONTEXT_SEPARATOR)
    }
}

pub fn craft_prompt(query: &str, context: &str, user_pref: Option<&str>) -> String {
    let pref_section = match user_pref.map(str::trim) {
        Some(pref) if !pref.is_empty() => format!("\nUser preferences: {pref}"),
        _ => String::new(),
    };
    format!("{INSTRUCTIONS}\n\nContext:\n{context}{pref_section}\n\nQuestion: {query}\nAnswer:")
}
