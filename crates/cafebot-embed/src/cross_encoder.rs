//! BERT cross-encoder relevance scorer (MS MARCO MiniLM style checkpoints).

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{linear, Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use cafebot_core::traits::PairwiseScorer;

use crate::device::select_device;
use crate::tokenize::tokenize_batch;

/// BERT `[PAD]` token id.
const PAD_ID: u32 = 0;

pub struct CrossEncoder {
    model: BertModel,
    pooler: Linear,
    classifier: Linear,
    tokenizer: Tokenizer,
    device: Device,
    max_len: usize,
}

impl CrossEncoder {
    pub fn new(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = select_device();
        info!(model_dir = %model_dir.display(), "loading cross-encoder");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let raw_config = std::fs::read_to_string(&config_path)
            .with_context(|| format!("reading {}", config_path.display()))?;
        let config: BertConfig = serde_json::from_str(&raw_config)?;
        let hidden_size = serde_json::from_str::<serde_json::Value>(&raw_config)?["hidden_size"]
            .as_u64()
            .ok_or_else(|| anyhow!("{} has no hidden_size", config_path.display()))? as usize;

        let weights = candle_core::pickle::read_all(model_dir.join("pytorch_model.bin"))?;
        let weights_map: HashMap<String, Tensor> = weights.into_iter().collect();
        let vb = VarBuilder::from_tensors(weights_map, DType::F32, &device);
        let model = BertModel::load(vb.pp("bert"), &config)?;
        let pooler = linear(hidden_size, hidden_size, vb.pp("bert.pooler.dense"))?;
        let classifier = linear(hidden_size, 1, vb.pp("classifier"))?;
        info!(hidden_size, "cross-encoder loaded");
        Ok(Self { model, pooler, classifier, tokenizer, device, max_len })
    }
}

impl PairwiseScorer for CrossEncoder {
    fn score_pairs(&self, pairs: &[(String, String)]) -> Result<Vec<f32>> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }
        let inputs: Vec<(&str, &str)> = pairs.iter().map(|(q, t)| (q.as_str(), t.as_str())).collect();
        let batch = tokenize_batch(&self.tokenizer, inputs, self.max_len, PAD_ID, &self.device)?;
        let hidden = self.model.forward(&batch.input_ids, &batch.token_type_ids, Some(&batch.attention_mask))?;
        let cls = hidden.narrow(1, 0, 1)?.squeeze(1)?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        let logits = self.classifier.forward(&pooled)?.squeeze(1)?;
        let scores: Vec<f32> = logits.to_device(&Device::Cpu)?.to_vec1()?;
        debug!(pairs = pairs.len(), "cross-encoder scored batch");
        Ok(scores)
    }
}
