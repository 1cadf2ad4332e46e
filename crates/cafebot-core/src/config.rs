//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge serialized defaults, `config.toml`,
//! `config.<env>.toml` and `APP_*` env vars (nested keys split on `__`, e.g.
//! `APP_RETRIEVAL__ALPHA=0.7`). Provides helpers to expand `~` and `${VAR}`
//! and to resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::chunking::ChunkingConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub items_path: String,
    pub faq_path: String,
    pub orders_path: String,
    pub index_dir: String,
    pub feedback_log: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            items_path: "data/items.json".to_string(),
            faq_path: "data/faq.json".to_string(),
            orders_path: "data/orders.json".to_string(),
            index_dir: "models/index".to_string(),
            feedback_log: "feedback_log.jsonl".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalSettings {
    pub max_features: usize,
}

impl Default for LexicalSettings {
    fn default() -> Self {
        Self { max_features: 5000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Candidates returned by hybrid search.
    pub k: usize,
    /// Dense weight in the fused score.
    pub alpha: f32,
    /// Leading candidates handed to the reranker.
    pub rerank_top: usize,
    /// Leading reranked candidates rendered into the prompt.
    pub context_docs: usize,
    pub sources_shown: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { k: 10, alpha: 0.6, rerank_top: 8, context_docs: 4, sources_shown: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendSettings {
    pub k: usize,
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
}

impl Default for RecommendSettings {
    fn default() -> Self {
        Self { k: 5, alpha: 0.5, beta: 0.3, gamma: 0.2 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackend {
    /// BGE-M3 (XLM-RoBERTa) weights loaded from `model_dir`.
    Bge,
    /// Deterministic token hashing; no model files needed.
    Hash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub backend: EmbeddingBackend,
    pub model_dir: String,
    pub dim: usize,
    pub max_len: usize,
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Bge,
            model_dir: "models/bge-m3".to_string(),
            dim: 1024,
            max_len: 256,
            batch_size: 32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RerankerBackend {
    CrossEncoder,
    Lexical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankerSettings {
    pub backend: RerankerBackend,
    pub model_dir: String,
    pub max_len: usize,
}

impl Default for RerankerSettings {
    fn default() -> Self {
        Self {
            backend: RerankerBackend::CrossEncoder,
            model_dir: "models/ms-marco-MiniLM-L-6-v2".to_string(),
            max_len: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub chunking: ChunkingConfig,
    pub lexical: LexicalSettings,
    pub retrieval: RetrievalSettings,
    pub recommend: RecommendSettings,
    pub embedding: EmbeddingSettings,
    pub reranker: RerankerSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        if !(0.0..=1.0).contains(&self.retrieval.alpha) {
            return Err(Error::InvalidConfig(format!(
                "retrieval.alpha must lie in [0, 1], got {}",
                self.retrieval.alpha
            )));
        }
        let positive = [
            ("retrieval.k", self.retrieval.k),
            ("retrieval.rerank_top", self.retrieval.rerank_top),
            ("retrieval.context_docs", self.retrieval.context_docs),
            ("recommend.k", self.recommend.k),
            ("lexical.max_features", self.lexical.max_features),
            ("embedding.dim", self.embedding.dim),
            ("embedding.max_len", self.embedding.max_len),
            ("embedding.batch_size", self.embedding.batch_size),
            ("reranker.max_len", self.reranker.max_len),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{key} must be positive")));
            }
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    /// Loads from the working directory, selecting the env overlay by `RUST_ENV`.
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(&env::current_dir()?, &env_name)
    }

    pub fn load_from(base_dir: &Path, env_name: &str) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(base_dir.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(base_dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base_dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base_dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));
        Ok(Self { figment, base_dir: base_dir.to_path_buf() })
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    /// Extracts and validates the typed settings.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Expands and resolves a configured path against the config directory.
    pub fn path<S: AsRef<str>>(&self, p: S) -> PathBuf {
        resolve_with_base(&self.base_dir, p)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
