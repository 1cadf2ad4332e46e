use cafebot_core::traits::Generator;

use crate::context::{CONTEXT_SEPARATOR, EMPTY_CONTEXT};

pub const UNSURE_ANSWER: &str = "I'm not sure about that. Could you ask about our menu or opening hours?";

/// Model-free generator: answers with the best context entry of the prompt.
/// FAQ entries contribute their answer; item entries are returned as listed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractiveGenerator;

impl Generator for ExtractiveGenerator {
    fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let Some((_, rest)) = prompt.split_once("Context:\n") else {
            return Ok(UNSURE_ANSWER.to_string());
        };
        let first = rest
            .split(CONTEXT_SEPARATOR)
            .next()
            .and_then(|entry| entry.split("\n\n").next())
            .and_then(|entry| entry.split("\nUser preferences:").next())
            .unwrap_or_default()
            .trim();
        if first.is_empty() || first == EMPTY_CONTEXT {
            return Ok(UNSURE_ANSWER.to_string());
        }
        if let Some(faq) = first.strip_prefix("FAQ: ") {
            if let Some((_, answer)) = faq.split_once(" A: ") {
                return Ok(answer.trim().to_string());
            }
        }
        Ok(first.to_string())
    }
}
