//! Fixed-size word windows with overlap.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 200, overlap: 50 }
    }
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        let config = Self { chunk_size, overlap };
        config.validate()?;
        Ok(config)
    }

    /// `overlap < chunk_size`, otherwise a window never advances.
    pub fn validate(&self) -> Result<()> {
        if self.overlap >= self.chunk_size {
            return Err(Error::ChunkingConfig { chunk_size: self.chunk_size, overlap: self.overlap });
        }
        Ok(())
    }

    /// Splits `text` into windows of `chunk_size` words, consecutive windows
    /// sharing `overlap` words. Text shorter than one window comes back whole.
    pub fn split(&self, text: &str) -> Result<Vec<String>> {
        self.validate()?;
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() <= self.chunk_size {
            return Ok(vec![text.to_string()]);
        }
        let mut chunks = Vec::new();
        let mut start = 0;
        while start < words.len() {
            let end = (start + self.chunk_size).min(words.len());
            chunks.push(words[start..end].join(" "));
            if end >= words.len() {
                break;
            }
            start = end - self.overlap;
        }
        Ok(chunks)
    }
}
