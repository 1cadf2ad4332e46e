use anyhow::anyhow;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use cafebot_core::error::{Error, Result};
use cafebot_core::traits::Embedder;

/// Scales `v` to unit length; zero vectors are left untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 && norm.is_finite() {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Embeds `texts` in chunks of `batch_size`, checking that every chunk comes
/// back with one vector per text at the embedder's dimension. Output rows are
/// unit-normalized and aligned with `texts`.
pub fn embed_in_batches(embedder: &dyn Embedder, texts: &[String], batch_size: usize) -> Result<Vec<Vec<f32>>> {
    let batch_size = batch_size.max(1);
    let dim = embedder.dim();
    let pb = ProgressBar::new(texts.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} embedding")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut out = Vec::with_capacity(texts.len());
    for chunk in texts.chunks(batch_size) {
        let vectors = embedder.embed_batch(chunk).map_err(Error::Collaborator)?;
        if vectors.len() != chunk.len() {
            return Err(Error::Collaborator(anyhow!(
                "embedder returned {} vectors for {} texts",
                vectors.len(),
                chunk.len()
            )));
        }
        for mut v in vectors {
            if v.len() != dim {
                return Err(Error::DimensionMismatch(format!("embedder declared dim {dim}, produced {}", v.len())));
            }
            l2_normalize(&mut v);
            out.push(v);
        }
        pb.inc(chunk.len() as u64);
    }
    pb.finish_and_clear();
    info!(count = out.len(), dim, "embedded texts");
    Ok(out)
}
