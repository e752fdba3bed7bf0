//! Embedding + stacked LSTM binary classifier
//!
//! Network layout, matching the exported safetensors names:
//!
//! ```text
//! embedding   [vocab_size, embed_dim]
//! lstm1       embed_dim -> hidden1, full sequence
//! lstm2       hidden1   -> hidden2, last state only
//! classifier  hidden2   -> 1, sigmoid
//! ```
//!
//! LSTM tensors use the `weight_ih_l0` / `weight_hh_l0` / `bias_ih_l0` /
//! `bias_hh_l0` layout with gates ordered input, forget, cell, output.
//! Dropout layers from training are identity at inference and have no
//! tensors.

use crate::classifier::SequenceClassifier;
use candle_core::{DType, Device, Tensor};
use candle_nn::rnn::{lstm, LSTMConfig, LSTM, RNN};
use candle_nn::{embedding, linear, Embedding, Linear, Module, VarBuilder};
use jobscreen_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Layer sizes of the exported network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LstmDims {
    /// Rows in the embedding table (the tokenizer's `num_words`)
    #[serde(default = "default_vocab_size")]
    pub vocab_size: usize,

    #[serde(default = "default_embed_dim")]
    pub embed_dim: usize,

    #[serde(default = "default_hidden1")]
    pub hidden1: usize,

    #[serde(default = "default_hidden2")]
    pub hidden2: usize,
}

impl Default for LstmDims {
    fn default() -> Self {
        Self {
            vocab_size: default_vocab_size(),
            embed_dim: default_embed_dim(),
            hidden1: default_hidden1(),
            hidden2: default_hidden2(),
        }
    }
}

struct LstmNetwork {
    embedding: Embedding,
    lstm1: LSTM,
    lstm2: LSTM,
    classifier: Linear,
    device: Device,
}

impl LstmNetwork {
    fn load(vb: VarBuilder, dims: LstmDims) -> candle_core::Result<Self> {
        let embedding = embedding(dims.vocab_size, dims.embed_dim, vb.pp("embedding"))?;
        let lstm1 = lstm(
            dims.embed_dim,
            dims.hidden1,
            LSTMConfig::default(),
            vb.pp("lstm1"),
        )?;
        let lstm2 = lstm(
            dims.hidden1,
            dims.hidden2,
            LSTMConfig::default(),
            vb.pp("lstm2"),
        )?;
        let classifier = linear(dims.hidden2, 1, vb.pp("classifier"))?;

        Ok(Self {
            embedding,
            lstm1,
            lstm2,
            classifier,
            device: vb.device().clone(),
        })
    }

    /// Single-sequence forward pass returning the sigmoid output
    fn forward(&self, ids: &[u32]) -> candle_core::Result<Vec<f32>> {
        let input = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
        let embedded = self.embedding.forward(&input)?;

        let states = self.lstm1.seq(&embedded)?;
        let sequence = self.lstm1.states_to_tensor(&states)?;

        let states = self.lstm2.seq(&sequence)?;
        let last = match states.last() {
            Some(state) => state.h().clone(),
            None => self.lstm2.zero_state(1)?.h().clone(),
        };

        let logits = self.classifier.forward(&last)?;
        candle_nn::ops::sigmoid(&logits)?.flatten_all()?.to_vec1::<f32>()
    }
}

/// Candle-backed [`SequenceClassifier`] over a frozen LSTM network
#[derive(Clone)]
pub struct LstmClassifier {
    name: String,
    dims: LstmDims,
    network: Arc<LstmNetwork>,
}

impl LstmClassifier {
    /// Load weights from a safetensors file
    pub fn load(weights_path: impl AsRef<Path>, dims: LstmDims, device: &Device) -> Result<Self> {
        let weights_path = weights_path.as_ref();
        if !weights_path.exists() {
            return Err(Error::artifact(format!(
                "Model file not found: {}",
                weights_path.display()
            )));
        }

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device).map_err(
                |e| Error::artifact(format!("Failed to load weights: {}", e)),
            )?
        };

        let name = weights_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("lstm")
            .to_string();

        let classifier = Self::from_var_builder(name, vb, dims)?;
        info!(
            "Loaded LSTM classifier '{}' from {} ({:?})",
            classifier.name,
            weights_path.display(),
            dims
        );
        Ok(classifier)
    }

    /// Build from an existing VarBuilder
    pub fn from_var_builder(
        name: impl Into<String>,
        vb: VarBuilder,
        dims: LstmDims,
    ) -> Result<Self> {
        let network = LstmNetwork::load(vb, dims)
            .map_err(|e| Error::artifact(format!("Model weights do not match {:?}: {}", dims, e)))?;

        Ok(Self {
            name: name.into(),
            dims,
            network: Arc::new(network),
        })
    }

    /// Layer sizes this classifier was built with
    pub fn dims(&self) -> LstmDims {
        self.dims
    }

    /// Run the forward pass on the calling thread
    pub fn score_blocking(&self, ids: &[u32]) -> Result<f32> {
        score_with(&self.network, self.dims, ids)
    }
}

fn score_with(network: &LstmNetwork, dims: LstmDims, ids: &[u32]) -> Result<f32> {
    if ids.is_empty() {
        return Err(Error::classifier("cannot score an empty sequence"));
    }
    if let Some(&id) = ids.iter().find(|&&id| id as usize >= dims.vocab_size) {
        return Err(Error::classifier(format!(
            "index {} is outside the embedding table ({} rows)",
            id, dims.vocab_size
        )));
    }

    let output = network
        .forward(ids)
        .map_err(|e| Error::classifier(format!("Model forward pass failed: {}", e)))?;

    let probability = output
        .first()
        .copied()
        .ok_or_else(|| Error::classifier("model produced no output"))?;

    if !probability.is_finite() {
        return Err(Error::classifier(format!(
            "model produced a non-finite probability: {}",
            probability
        )));
    }

    debug!("LSTM scored {} ids: {:.6}", ids.len(), probability);
    Ok(probability.clamp(0.0, 1.0))
}

#[async_trait::async_trait]
impl SequenceClassifier for LstmClassifier {
    async fn score(&self, ids: &[u32]) -> Result<f32> {
        let network = self.network.clone();
        let dims = self.dims;
        let ids = ids.to_vec();

        tokio::task::spawn_blocking(move || score_with(&network, dims, &ids))
            .await
            .map_err(|e| Error::internal(format!("inference task failed: {}", e)))?
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn default_vocab_size() -> usize {
    30_000
}

fn default_embed_dim() -> usize {
    128
}

fn default_hidden1() -> usize {
    128
}

fn default_hidden2() -> usize {
    64
}
