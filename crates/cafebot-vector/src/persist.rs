//! On-disk layout of a saved vector index.
//!
//! `<dir>/vectors` is a LanceDB database holding one `(ordinal, vector)` row per
//! document; `<dir>/meta.json` holds the ordered metadata and build facts. The
//! two halves are only ever read together.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use arrow_array::cast::AsArray;
use arrow_array::types::Float32Type;
use arrow_array::{FixedSizeListArray, Int32Array, RecordBatch, RecordBatchIterator};
use futures::TryStreamExt;
use lancedb::connect;
use lancedb::query::ExecutableQuery;
use serde::{Deserialize, Serialize};

use cafebot_core::error::{Error, Result};
use cafebot_core::types::DocMeta;

use crate::schema::{build_vector_schema, META_FILE, VECTOR_DIR, VECTOR_TABLE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub dim: usize,
    pub count: usize,
    /// blake3 over the document texts the vectors were computed from.
    pub content_hash: String,
    /// RFC 3339 timestamp of the build.
    pub built_at: String,
    pub metas: Vec<DocMeta>,
}

/// Order-sensitive digest of a corpus; each text is length-prefixed.
pub fn content_hash<S: AsRef<str>>(texts: &[S]) -> String {
    let mut hasher = blake3::Hasher::new();
    for text in texts {
        let bytes = text.as_ref().as_bytes();
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    hasher.finalize().to_hex().to_string()
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(Error::Io)
}

pub(crate) async fn write_vectors(dir: &Path, vectors: &[Vec<f32>], dim: usize) -> anyhow::Result<()> {
    let db_path = dir.join(VECTOR_DIR);
    if db_path.exists() {
        std::fs::remove_dir_all(&db_path).with_context(|| format!("removing {}", db_path.display()))?;
    }
    let dim = i32::try_from(dim).context("vector dimension exceeds i32")?;
    let schema = build_vector_schema(dim);
    let ordinals = (0..vectors.len())
        .map(i32::try_from)
        .collect::<std::result::Result<Vec<i32>, _>>()
        .context("too many vectors for an i32 ordinal")?;
    let rows = vectors.iter().map(|v| Some(v.iter().map(|&x| Some(x)).collect::<Vec<_>>()));
    let record_batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int32Array::from(ordinals)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(rows, dim)),
        ],
    )?;
    let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
    let db = connect(db_path.to_string_lossy().as_ref()).execute().await?;
    db.create_table(VECTOR_TABLE, reader).execute().await?;
    Ok(())
}

/// Rows as `(ordinal, vector)` in storage order.
pub(crate) async fn read_vectors(dir: &Path) -> anyhow::Result<Vec<(i32, Vec<f32>)>> {
    let db_path = dir.join(VECTOR_DIR);
    let db = connect(db_path.to_string_lossy().as_ref()).execute().await?;
    let table = db.open_table(VECTOR_TABLE).execute().await?;
    let mut stream = table.query().execute().await?;
    let mut rows = Vec::new();
    while let Some(batch) = stream.try_next().await? {
        let ordinals = batch
            .column_by_name("ordinal")
            .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
            .ok_or_else(|| anyhow!("vectors.ordinal column missing"))?;
        let vectors = batch
            .column_by_name("vector")
            .and_then(|c| c.as_any().downcast_ref::<FixedSizeListArray>())
            .ok_or_else(|| anyhow!("vectors.vector column missing"))?;
        for i in 0..batch.num_rows() {
            let list = vectors.value(i);
            let values = list
                .as_primitive_opt::<Float32Type>()
                .ok_or_else(|| anyhow!("vectors.vector is not float32"))?;
            rows.push((ordinals.value(i), values.values().to_vec()));
        }
    }
    Ok(rows)
}

/// Writes `meta.json` via a temp file and rename.
pub(crate) fn write_metadata(dir: &Path, meta: &IndexMetadata) -> Result<()> {
    let tmp = dir.join(format!("{META_FILE}.tmp"));
    std::fs::write(&tmp, serde_json::to_vec_pretty(meta)?)?;
    std::fs::rename(&tmp, dir.join(META_FILE))?;
    Ok(())
}

pub(crate) fn read_metadata(dir: &Path) -> Result<IndexMetadata> {
    let path = dir.join(META_FILE);
    let bytes = std::fs::read(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        _ => Error::Io(e),
    })?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Fails with `NotFound` unless both halves of the saved index are present.
pub(crate) fn ensure_complete(dir: &Path) -> Result<()> {
    for part in [META_FILE, VECTOR_DIR] {
        let path = dir.join(part);
        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()));
        }
    }
    Ok(())
}
