use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use tokenizers::{EncodeInput, Tokenizer};

/// Token tensors for one batch, each `[B, T]` with `T` the longest row capped at `max_len`.
pub struct EncodedBatch {
    pub input_ids: Tensor,
    pub attention_mask: Tensor,
    pub token_type_ids: Tensor,
}

/// Encodes single texts or `(query, text)` pairs, truncating to `max_len` and
/// right-padding with `pad_id`.
pub fn tokenize_batch<'s, E>(
    tokenizer: &Tokenizer,
    inputs: Vec<E>,
    max_len: usize,
    pad_id: u32,
    device: &Device,
) -> Result<EncodedBatch>
where
    E: Into<EncodeInput<'s>>,
{
    let batch = inputs.len();
    let mut rows = Vec::with_capacity(batch);
    for input in inputs {
        let enc = tokenizer.encode(input, true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
        let mut ids = enc.get_ids().to_vec();
        let mut mask = enc.get_attention_mask().to_vec();
        let mut types = enc.get_type_ids().to_vec();
        if ids.len() > max_len { ids.truncate(max_len); mask.truncate(max_len); types.truncate(max_len); }
        rows.push((ids, mask, types));
    }
    let seq_len = rows.iter().map(|(ids, _, _)| ids.len()).max().unwrap_or(0).max(1);

    let mut all_ids = Vec::with_capacity(batch * seq_len);
    let mut all_mask = Vec::with_capacity(batch * seq_len);
    let mut all_types = Vec::with_capacity(batch * seq_len);
    for (ids, mask, types) in rows {
        let pad = seq_len - ids.len();
        all_ids.extend(ids.into_iter().chain(std::iter::repeat(pad_id).take(pad)));
        all_mask.extend(mask.into_iter().chain(std::iter::repeat(0).take(pad)));
        all_types.extend(types.into_iter().chain(std::iter::repeat(0).take(pad)));
    }
    Ok(EncodedBatch {
        input_ids: Tensor::from_vec(all_ids, (batch, seq_len), device)?,
        attention_mask: Tensor::from_vec(all_mask, (batch, seq_len), device)?,
        token_type_ids: Tensor::from_vec(all_types, (batch, seq_len), device)?,
    })
}
