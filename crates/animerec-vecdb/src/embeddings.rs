//! # Sentence Embeddings
//!
//! Local sentence-transformer inference with candle. The model directory
//! must hold `config.json`, `tokenizer.json` and `model.safetensors`
//! (e.g. an export of `all-MiniLM-L6-v2`).

use std::path::{Path, PathBuf};

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tracing::debug;

use crate::error::{Result, VecDbError};

/// Default location of the embedding model.
pub const DEFAULT_MODEL_DIR: &str = "models/all-MiniLM-L6-v2";
/// Longer inputs are truncated to this many tokens.
pub const MAX_TOKENS: usize = 256;
/// Texts embedded per forward pass.
pub const BATCH_SIZE: usize = 32;

/// Maps texts to fixed-size vectors.
pub trait Embedder {
    /// Length of every produced vector.
    fn dimension(&self) -> usize;

    /// Embeds a batch of texts, one vector per text, in order.
    ///
    /// # Errors
    ///
    /// Returns `VecDbError::Embedding` if inference fails.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Embeds a single text.
    ///
    /// # Errors
    ///
    /// Returns `VecDbError::Embedding` if inference fails.
    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text])?
            .pop()
            .ok_or_else(|| VecDbError::Embedding("embedder returned no vector".into()))
    }
}

/// BERT-family sentence embedder: masked mean pooling, L2-normalized.
pub struct MiniLmEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dimension: usize,
}

impl MiniLmEmbedder {
    /// Loads the model from `dir` on the CPU.
    ///
    /// # Errors
    ///
    /// Returns `VecDbError::ModelLoad` if any model file is missing or
    /// unreadable.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let config_path = require(dir, "config.json")?;
        let tokenizer_path = require(dir, "tokenizer.json")?;
        let weights_path = require(dir, "model.safetensors")?;

        let config_str = std::fs::read_to_string(&config_path)?;
        let raw: serde_json::Value = serde_json::from_str(&config_str)?;
        let dimension = raw
            .get("hidden_size")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| VecDbError::ModelLoad("config.json has no hidden_size".into()))?
            as usize;
        let config: BertConfig = serde_json::from_value(raw)?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| VecDbError::ModelLoad(format!("tokenizer: {e}")))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| VecDbError::ModelLoad(format!("tokenizer: {e}")))?;

        let device = Device::Cpu;
        // The weights file is memory-mapped and must not change while loaded.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DTYPE, &device) }
            .map_err(|e| VecDbError::ModelLoad(e.to_string()))?;
        let model =
            BertModel::load(vb, &config).map_err(|e| VecDbError::ModelLoad(e.to_string()))?;

        debug!(dir = %dir.display(), dimension, "loaded embedding model");
        Ok(Self {
            model,
            tokenizer,
            device,
            dimension,
        })
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| VecDbError::Embedding(e.to_string()))?;

        let ids = encodings
            .iter()
            .map(|e| Tensor::new(e.get_ids(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()?;
        let masks = encodings
            .iter()
            .map(|e| Tensor::new(e.get_attention_mask(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()?;

        let input_ids = Tensor::stack(&ids, 0)?;
        let attention_mask = Tensor::stack(&masks, 0)?;
        let token_type_ids = input_ids.zeros_like()?;

        // [batch, seq, hidden]
        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        let mask = attention_mask.to_dtype(DTYPE)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?.clamp(1e-9, f64::MAX)?;
        let pooled = summed.broadcast_div(&counts)?;
        let norms = pooled.sqr()?.sum_keepdim(1)?.sqrt()?.clamp(1e-12, f64::MAX)?;
        let normalized = pooled.broadcast_div(&norms)?;

        Ok(normalized.to_vec2::<f32>()?)
    }
}

impl Embedder for MiniLmEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(BATCH_SIZE) {
            out.extend(self.embed_batch(batch)?);
        }
        Ok(out)
    }
}

fn require(dir: &Path, file: &str) -> Result<PathBuf> {
    let path = dir.join(file);
    if path.exists() {
        Ok(path)
    } else {
        Err(VecDbError::ModelLoad(format!("{} not found", path.display())))
    }
}
