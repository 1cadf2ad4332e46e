//! BGE-M3 sentence embedder (XLM-RoBERTa encoder, masked mean pooling).

use anyhow::{anyhow, ensure, Result};
use std::path::Path;
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use cafebot_core::traits::Embedder;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::tokenize_batch;

/// XLM-RoBERTa `<pad>` token id.
const PAD_ID: u32 = 1;

pub struct BgeM3Embedder {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
}

impl BgeM3Embedder {
    /// Loads `tokenizer.json`, `config.json` and `pytorch_model.bin` from `model_dir`.
    pub fn new(model_dir: &Path, dim: usize, max_len: usize) -> Result<Self> {
        let device = select_device();
        info!(model_dir = %model_dir.display(), "loading BGE-M3 model");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let config_path = model_dir.join("config.json");
        let config: XLMRobertaConfig = serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;
        let weights_path = model_dir.join("pytorch_model.bin");
        let weights = candle_core::pickle::read_all(&weights_path)?;
        let weights_map: std::collections::HashMap<String, Tensor> = weights.into_iter().collect();
        let vb = VarBuilder::from_tensors(weights_map, DType::F32, &device);
        let model = XLMRobertaModel::new(&config, vb)?;
        info!(dim, max_len, "BGE-M3 model loaded");
        Ok(Self { model, tokenizer, device, dim, max_len })
    }
}

impl Embedder for BgeM3Embedder {
    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() { return Ok(Vec::new()); }
        let start = Instant::now();
        let inputs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let batch = tokenize_batch(&self.tokenizer, inputs, self.max_len, PAD_ID, &self.device)?;
        let token_type_ids = batch.token_type_ids.zeros_like()?;
        let hidden = self.model.forward(&batch.input_ids, &batch.attention_mask, &token_type_ids, None, None, None)?;
        let pooled = masked_mean_l2(&hidden, &batch.attention_mask)?;
        let vectors: Vec<Vec<f32>> = pooled.to_device(&Device::Cpu)?.to_vec2()?;
        for v in &vectors {
            ensure!(v.len() == self.dim, "model produced {}-d vectors, configured for {}", v.len(), self.dim);
        }
        debug!(batch = texts.len(), elapsed_ms = start.elapsed().as_millis() as u64, "embedded batch");
        Ok(vectors)
    }
}
