//! On-disk classifier artifacts for integration tests.
//!
//! Writes a tiny but real model: every cue word embeds to the one-hot vector
//! of its label, filler words embed to zero, and the classifier head scales
//! the pooled vector straight into logits. Texts dominated by one label's cue
//! words are therefore classified as that label.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use candle_core::{Device, Tensor};
use tempfile::TempDir;

use mindcare::config::{ArtifactPaths, ClassifierConfig};

pub const WIDTH: usize = 100;

/// Output order of the fixture model.
pub const LABELS: [&str; 6] = ["sadness", "joy", "love", "anger", "fear", "surprise"];

/// Words that push the fixture model towards a label.
pub const CUES: &[(&str, &str)] = &[
    ("finally", "joy"),
    ("achieved", "joy"),
    ("goal", "joy"),
    ("happy", "joy"),
    ("miss", "sadness"),
    ("lonely", "sadness"),
    ("adore", "love"),
    ("darling", "love"),
    ("furious", "anger"),
    ("unfair", "anger"),
    ("scared", "fear"),
    ("afraid", "fear"),
    ("wow", "surprise"),
    ("unexpected", "surprise"),
];

/// Indexed words with no emotional weight.
pub const FILLER: &[&str] = &["i", "my", "the", "so", "am", "today"];

const OOV_TOKEN: &str = "<OOV>";
const LOGIT_SCALE: f32 = 10.0;

/// Temporary data directory holding a full artifact set.
pub struct ArtifactDir {
    pub temp_dir: TempDir,
}

impl ArtifactDir {
    /// Artifacts with a Keras word-index tokenizer.
    pub fn keras() -> Self {
        let dir = Self::empty();
        dir.write("tokenizer.json", &keras_tokenizer_json());
        dir.write_model(Some(WIDTH));
        dir.write_labels(&LABELS);
        dir
    }

    /// Artifacts with a HuggingFace word-level tokenizer sharing the same ids.
    pub fn pretrained() -> Self {
        let dir = Self::empty();
        dir.write("tokenizer.json", &pretrained_tokenizer_json());
        dir.write_model(Some(WIDTH));
        dir.write_labels(&LABELS);
        dir
    }

    /// A data directory with no artifacts at all.
    pub fn empty() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory for artifacts");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }

    pub fn config(&self) -> ClassifierConfig {
        ClassifierConfig {
            artifacts: ArtifactPaths::in_dir(self.path()),
            sequence_width: WIDTH,
        }
    }

    pub fn write(&self, name: &str, contents: &str) {
        std::fs::write(self.file(name), contents).expect("Failed to write artifact");
    }

    pub fn remove(&self, name: &str) {
        std::fs::remove_file(self.file(name)).expect("Failed to remove artifact");
    }

    pub fn write_labels(&self, labels: &[&str]) {
        self.write(
            "labels.json",
            &serde_json::to_string(labels).expect("Failed to encode labels"),
        );
    }

    /// Write `model.json` and `model.safetensors`.
    pub fn write_model(&self, trained_width: Option<usize>) {
        let vocab = vocabulary();
        let vocab_size = vocab.values().copied().max().unwrap_or(0) as usize + 1;
        let dim = LABELS.len();

        let config = serde_json::json!({
            "vocab_size": vocab_size,
            "embedding_dim": dim,
            "num_labels": dim,
            "encoder": "mean_pool",
            "sequence_width": trained_width,
            "pad_id": 0,
        });
        self.write("model.json", &config.to_string());

        let mut embedding = vec![0f32; vocab_size * dim];
        for (word, label) in CUES {
            let row = vocab[*word] as usize;
            let col = label_index(label);
            embedding[row * dim + col] = 1.0;
        }

        let mut classifier = vec![0f32; dim * dim];
        for i in 0..dim {
            classifier[i * dim + i] = LOGIT_SCALE;
        }

        let device = Device::Cpu;
        let mut tensors = HashMap::new();
        tensors.insert(
            "embedding.weight".to_string(),
            Tensor::from_vec(embedding, (vocab_size, dim), &device).expect("embedding tensor"),
        );
        tensors.insert(
            "classifier.weight".to_string(),
            Tensor::from_vec(classifier, (dim, dim), &device).expect("classifier tensor"),
        );
        tensors.insert(
            "classifier.bias".to_string(),
            Tensor::zeros(dim, candle_core::DType::F32, &device).expect("bias tensor"),
        );
        candle_core::safetensors::save(&tensors, self.file("model.safetensors"))
            .expect("Failed to write model weights");
    }
}

pub fn label_index(label: &str) -> usize {
    LABELS
        .iter()
        .position(|l| *l == label)
        .expect("label is part of the fixture set")
}

/// Word ids shared by both tokenizer formats. Id 0 is padding, 1 is OOV.
pub fn vocabulary() -> HashMap<String, u32> {
    FILLER
        .iter()
        .copied()
        .chain(CUES.iter().map(|(word, _)| *word))
        .enumerate()
        .map(|(i, word)| (word.to_string(), i as u32 + 2))
        .collect()
}

/// Document in the shape written by Keras' `Tokenizer.to_json()`.
fn keras_tokenizer_json() -> String {
    let mut word_index = vocabulary();
    word_index.insert(OOV_TOKEN.to_string(), 1);
    let encoded = serde_json::to_string(&word_index).expect("Failed to encode word index");

    serde_json::json!({
        "class_name": "Tokenizer",
        "config": {
            "num_words": null,
            "filters": "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n",
            "lower": true,
            "split": " ",
            "char_level": false,
            "oov_token": OOV_TOKEN,
            "document_count": 16000,
            "word_index": encoded,
        }
    })
    .to_string()
}

fn pretrained_tokenizer_json() -> String {
    let mut vocab = vocabulary();
    vocab.insert("[PAD]".to_string(), 0);
    vocab.insert("[UNK]".to_string(), 1);

    serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": { "type": "Lowercase" },
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": "[UNK]"
        }
    })
    .to_string()
}
