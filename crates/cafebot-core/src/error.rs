use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Document store is empty")]
    EmptyStore,

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid chunking config: overlap ({overlap}) must be smaller than chunk_size ({chunk_size})")]
    ChunkingConfig { chunk_size: usize, overlap: usize },

    #[error("Index has not been built")]
    NotBuilt,

    #[error("Indexes are misaligned: {documents} documents, {vectors} vectors, {lexical} lexical rows")]
    Misaligned { documents: usize, vectors: usize, lexical: usize },

    #[error("Persisted index is stale: {0}")]
    StaleIndex(String),

    #[error("Duplicate document id: {0}")]
    DuplicateId(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Collaborator call failed: {0}")]
    Collaborator(#[source] anyhow::Error),

    #[error("Vector storage failed: {0}")]
    Storage(#[source] anyhow::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
