//! Candle-based inference backend for the emotion model.
//!
//! Pure-Rust ML runtime using candle with Metal GPU acceleration on macOS.
//! The model is a small sequence classifier: token embedding, a sequence
//! encoder (masked mean pooling or an LSTM), an optional ReLU dense layer and
//! a softmax classification head.

use std::path::PathBuf;

use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{Embedding, Linear, Module, VarBuilder, LSTM, RNN};
use serde::{Deserialize, Serialize};

/// Anything that maps one fixed-width id sequence to a probability
/// distribution over the label set.
pub trait SequenceModel: Send + Sync {
    /// Number of output classes.
    fn num_labels(&self) -> usize;

    /// Run a single forward pass. The returned vector has `num_labels()`
    /// entries summing to ~1.
    fn predict(&self, sequence: &[u32]) -> Result<Vec<f32>>;
}

/// Paths to the model artifacts on disk.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config_path: PathBuf,
    pub weights_path: PathBuf,
}

/// How the embedded sequence is reduced to a single vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceEncoder {
    /// Average of embeddings over non-padding positions.
    #[default]
    MeanPool,
    /// Final hidden state of an LSTM run over the unpadded prefix.
    Lstm,
}

/// Architecture description stored next to the weights as `model.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub vocab_size: usize,
    pub embedding_dim: usize,
    pub num_labels: usize,
    #[serde(default)]
    pub encoder: SequenceEncoder,
    /// LSTM units; defaults to `embedding_dim`.
    #[serde(default)]
    pub hidden_size: Option<usize>,
    /// Width of the optional ReLU layer before the classifier.
    #[serde(default)]
    pub dense_size: Option<usize>,
    /// Input width the model was trained on, if recorded.
    #[serde(default)]
    pub sequence_width: Option<usize>,
    #[serde(default)]
    pub pad_id: u32,
}

/// Select the best available compute device.
///
/// Tries Metal (macOS) or CUDA if the corresponding feature is enabled,
/// probing softmax support before committing to the GPU.
pub fn select_device() -> Device {
    #[cfg(target_os = "macos")]
    {
        if let Ok(device) = Device::new_metal(0) {
            if probe_softmax(&device) {
                tracing::info!("Using Metal GPU for inference");
                return device;
            }
            tracing::warn!("Metal GPU available but softmax not supported, falling back to CPU");
        }
    }
    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            if probe_softmax(&device) {
                tracing::info!("Using CUDA GPU for inference");
                return device;
            }
            tracing::warn!("CUDA GPU available but softmax not supported, falling back to CPU");
        }
    }
    tracing::info!("Using CPU for inference");
    Device::Cpu
}

#[allow(dead_code)]
fn probe_softmax(device: &Device) -> bool {
    (|| -> candle_core::Result<()> {
        let input = Tensor::ones((1, 4), DType::F32, device)?;
        let _ = candle_nn::ops::softmax(&input, 1)?;
        Ok(())
    })()
    .is_ok()
}

/// Embedding + encoder + dense emotion classifier.
pub struct CandleSequenceModel {
    config: ModelConfig,
    embedding: Embedding,
    lstm: Option<LSTM>,
    hidden: Option<Linear>,
    classifier: Linear,
    device: Device,
}

impl CandleSequenceModel {
    /// Load the model from its config and safetensors weights.
    pub fn load(files: &ModelFiles, device: Device) -> Result<Self> {
        let config_str = std::fs::read_to_string(&files.config_path)
            .context("Failed to read model config")?;
        let config: ModelConfig =
            serde_json::from_str(&config_str).context("Failed to parse model config")?;

        // SAFETY: mmap'd safetensors file, safe as long as the file is not modified
        // while the model is in use.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&files.weights_path], DType::F32, &device)
                .context("Failed to load model weights")?
        };

        Self::new(config, vb, device)
    }

    /// Build the model from an already-prepared variable builder.
    pub fn new(config: ModelConfig, vb: VarBuilder, device: Device) -> Result<Self> {
        if config.num_labels == 0 {
            anyhow::bail!("model config declares zero labels");
        }
        if config.vocab_size == 0 || config.embedding_dim == 0 {
            anyhow::bail!("model config declares an empty embedding table");
        }

        let embedding = candle_nn::embedding(
            config.vocab_size,
            config.embedding_dim,
            vb.pp("embedding"),
        )
        .context("Failed to load embedding weights")?;

        let (lstm, mut features) = match config.encoder {
            SequenceEncoder::MeanPool => (None, config.embedding_dim),
            SequenceEncoder::Lstm => {
                let units = config.hidden_size.unwrap_or(config.embedding_dim);
                let lstm = candle_nn::lstm(
                    config.embedding_dim,
                    units,
                    candle_nn::LSTMConfig::default(),
                    vb.pp("lstm"),
                )
                .context("Failed to load LSTM weights")?;
                (Some(lstm), units)
            }
        };

        let hidden = match config.dense_size {
            Some(size) => {
                let layer = candle_nn::linear(features, size, vb.pp("hidden"))
                    .context("Failed to load hidden layer weights")?;
                features = size;
                Some(layer)
            }
            None => None,
        };

        let classifier = candle_nn::linear(features, config.num_labels, vb.pp("classifier"))
            .context("Failed to load classifier weights")?;

        Ok(Self {
            config,
            embedding,
            lstm,
            hidden,
            classifier,
            device,
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn encode(&self, embedded: &Tensor, sequence: &[u32]) -> Result<Tensor> {
        let pad_id = self.config.pad_id;

        match &self.lstm {
            None => {
                let mask: Vec<f32> = sequence
                    .iter()
                    .map(|&id| if id == pad_id { 0.0 } else { 1.0 })
                    .collect();
                let count = mask.iter().sum::<f32>().max(1.0);
                let mask = Tensor::from_vec(mask, (1, sequence.len(), 1), &self.device)?;
                let summed = embedded.broadcast_mul(&mask)?.sum(1)?;
                Ok((summed / count as f64)?)
            }
            Some(lstm) => {
                // Padding is trailing, so the real tokens are a prefix.
                let real_len = sequence
                    .iter()
                    .rposition(|&id| id != pad_id)
                    .map_or(0, |pos| pos + 1);
                if real_len == 0 {
                    let state = lstm.zero_state(1)?;
                    return Ok(state.h().clone());
                }
                let prefix = embedded.narrow(1, 0, real_len)?;
                let states = lstm.seq(&prefix)?;
                let last = states
                    .last()
                    .context("LSTM produced no states for a non-empty sequence")?;
                Ok(last.h().clone())
            }
        }
    }
}

impl SequenceModel for CandleSequenceModel {
    fn num_labels(&self) -> usize {
        self.config.num_labels
    }

    fn predict(&self, sequence: &[u32]) -> Result<Vec<f32>> {
        if sequence.is_empty() {
            anyhow::bail!("cannot run the model on an empty sequence");
        }
        if let Some(&bad) = sequence
            .iter()
            .find(|&&id| id as usize >= self.config.vocab_size)
        {
            anyhow::bail!(
                "token id {} is outside the embedding table ({} entries)",
                bad,
                self.config.vocab_size
            );
        }

        let ids = Tensor::from_vec(sequence.to_vec(), (1, sequence.len()), &self.device)?;

        // [1, width] -> [1, width, embedding_dim]
        let embedded = self.embedding.forward(&ids)?;
        let mut features = self.encode(&embedded, sequence)?;

        if let Some(hidden) = &self.hidden {
            features = hidden.forward(&features)?.relu()?;
        }

        // [1, num_labels] logits -> probabilities
        let logits = self.classifier.forward(&features)?;
        let probs = candle_nn::ops::softmax(&logits, 1)?;
        let rows = probs.to_vec2::<f32>()?;

        rows.into_iter()
            .next()
            .context("Model returned an empty batch")
    }
}
