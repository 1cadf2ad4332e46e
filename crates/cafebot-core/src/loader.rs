//! Dataset loading from JSON tables.
//!
//! Three files feed the store: items (`[{id, item}]`), FAQ entries
//! (`[{question, answer}]`) and order statistics
//! (`[{id, times_appeared, food_rating}]`). Ids may be strings or numbers.

use std::collections::HashMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::{Error, Result};
use crate::store::{FaqRow, ItemRow, OrderStats};

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(deserialize_with = "de_id")]
    id: String,
    item: String,
}

#[derive(Debug, Deserialize)]
struct RawFaq {
    question: String,
    answer: String,
}

#[derive(Debug, Deserialize)]
struct RawOrder {
    #[serde(deserialize_with = "de_id")]
    id: String,
    times_appeared: u64,
    food_rating: f32,
}

fn de_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected string or number id, got {other}"))),
    }
}

/// The three source tables, normalized and de-duplicated.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub items: Vec<ItemRow>,
    pub faqs: Vec<FaqRow>,
    pub orders: Vec<OrderStats>,
}

impl Dataset {
    pub fn load(items_path: &Path, faq_path: &Path, orders_path: &Path) -> Result<Self> {
        Ok(Self {
            items: load_items(items_path)?,
            faqs: load_faqs(faq_path)?,
            orders: load_orders(orders_path)?,
        })
    }
}

/// Lowercases, expands the chat shorthand `" u "`, and collapses whitespace.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase().replace(" u ", " you ");
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keeps one row per question: the one with the longest answer. The survivor
/// takes the slot of the question's first occurrence.
pub fn dedupe_faqs(rows: Vec<FaqRow>) -> Vec<FaqRow> {
    let mut slot_by_question: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<FaqRow> = Vec::with_capacity(rows.len());
    for row in rows {
        match slot_by_question.get(&row.question) {
            Some(&slot) => {
                if row.answer.chars().count() > out[slot].answer.chars().count() {
                    out[slot] = row;
                }
            }
            None => {
                slot_by_question.insert(row.question.clone(), out.len());
                out.push(row);
            }
        }
    }
    out
}

pub fn load_items(path: &Path) -> Result<Vec<ItemRow>> {
    let raw: Vec<RawItem> = read_json(path)?;
    debug!(path = %path.display(), rows = raw.len(), "loaded items");
    Ok(raw
        .into_iter()
        .map(|r| ItemRow { item_id: r.id, item_name: normalize_text(&r.item) })
        .collect())
}

pub fn load_faqs(path: &Path) -> Result<Vec<FaqRow>> {
    let raw: Vec<RawFaq> = read_json(path)?;
    debug!(path = %path.display(), rows = raw.len(), "loaded faq entries");
    let rows = raw
        .into_iter()
        .map(|r| FaqRow { question: normalize_text(&r.question), answer: r.answer })
        .collect();
    Ok(dedupe_faqs(rows))
}

pub fn load_orders(path: &Path) -> Result<Vec<OrderStats>> {
    let raw: Vec<RawOrder> = read_json(path)?;
    debug!(path = %path.display(), rows = raw.len(), "loaded order statistics");
    Ok(raw
        .into_iter()
        .map(|r| OrderStats { item_id: r.id, num_orders: r.times_appeared, avg_rating: r.food_rating })
        .collect())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        _ => Error::Io(e),
    })?;
    Ok(serde_json::from_str(&content)?)
}
