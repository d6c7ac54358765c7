//! Emotion classifier: text → fixed-width id sequence → probabilities → label.
//!
//! Artifacts (model, tokenizer, label decoder) are loaded once per
//! [`EmotionClassifier`] handle, lazily on first use or eagerly through
//! [`EmotionClassifier::load`]. Concurrent first calls block on the same
//! one-time initialization.
//!
//! Loading is fail-open: if any artifact is missing, corrupt, or inconsistent
//! with the others, the classifier enters degraded mode and answers every
//! request with [`DEGRADED_LABEL`] at [`DEGRADED_CONFIDENCE`] so the
//! surrounding application stays usable.

pub mod labels;
pub mod model;
pub mod sequence;
pub mod vocab;

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ClassifierConfig;
use crate::error::{ArtifactKind, MoodError};

pub use labels::LabelDecoder;
pub use model::{CandleSequenceModel, ModelConfig, ModelFiles, SequenceEncoder, SequenceModel};
pub use sequence::{FixedWidthSequence, DEFAULT_PAD_ID, DEFAULT_SEQUENCE_WIDTH};
pub use vocab::{TextEncoder, WordIndexTokenizer};

/// Label served while artifacts are unavailable.
pub const DEGRADED_LABEL: &str = "joy";

/// Confidence served while artifacts are unavailable.
pub const DEGRADED_CONFIDENCE: f32 = 99.9;

/// One classified utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    /// Maximum class probability as a percentage, two decimals.
    pub confidence: f32,
}

impl Classification {
    pub fn degraded() -> Self {
        Self {
            label: DEGRADED_LABEL.to_string(),
            confidence: DEGRADED_CONFIDENCE,
        }
    }
}

/// Lifecycle state reported by [`EmotionClassifier::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ClassifierStatus {
    Unloaded,
    Ready { labels: Vec<String> },
    Degraded { reason: String },
}

/// Tokenizer, decoder and model, checked against each other.
pub struct ClassifierArtifacts {
    encoder: TextEncoder,
    decoder: LabelDecoder,
    model: Box<dyn SequenceModel>,
    width: usize,
}

impl ClassifierArtifacts {
    /// Assemble artifacts, rejecting combinations that would silently
    /// mis-classify.
    pub fn new(
        encoder: TextEncoder,
        decoder: LabelDecoder,
        model: Box<dyn SequenceModel>,
        width: usize,
    ) -> Result<Self, MoodError> {
        if width == 0 {
            return Err(MoodError::Config(
                "sequence width must be at least 1".to_string(),
            ));
        }
        if model.num_labels() != decoder.len() {
            return Err(MoodError::Config(format!(
                "model produces {} classes but the label decoder knows {}",
                model.num_labels(),
                decoder.len()
            )));
        }
        Ok(Self {
            encoder,
            decoder,
            model,
            width,
        })
    }

    /// Read all artifacts named by `config` from disk.
    pub fn load(config: &ClassifierConfig) -> Result<Self, MoodError> {
        if config.sequence_width == 0 {
            return Err(MoodError::Config(
                "sequence width must be at least 1".to_string(),
            ));
        }
        let paths = &config.artifacts;

        let encoder = TextEncoder::load(&paths.tokenizer).map_err(|e| {
            MoodError::artifact(ArtifactKind::Tokenizer, &paths.tokenizer, format!("{:#}", e))
        })?;

        let decoder = LabelDecoder::load(&paths.labels).map_err(|e| {
            MoodError::artifact(ArtifactKind::LabelDecoder, &paths.labels, format!("{:#}", e))
        })?;

        let files = ModelFiles {
            config_path: paths.model_config.clone(),
            weights_path: paths.model_weights.clone(),
        };
        let model = CandleSequenceModel::load(&files, model::select_device()).map_err(|e| {
            MoodError::artifact(
                ArtifactKind::ModelWeights,
                &paths.model_weights,
                format!("{:#}", e),
            )
        })?;

        let model_config = model.config();
        if let Some(trained_width) = model_config.sequence_width {
            if trained_width != config.sequence_width {
                return Err(MoodError::artifact(
                    ArtifactKind::ModelConfig,
                    &paths.model_config,
                    format!(
                        "model was trained on width {} but the classifier is configured for {}",
                        trained_width, config.sequence_width
                    ),
                ));
            }
        }
        if model_config.pad_id != encoder.pad_id() {
            return Err(MoodError::artifact(
                ArtifactKind::Tokenizer,
                &paths.tokenizer,
                format!(
                    "tokenizer pads with id {} but the model masks id {}",
                    encoder.pad_id(),
                    model_config.pad_id
                ),
            ));
        }
        if encoder.id_upper_bound() > model_config.vocab_size {
            return Err(MoodError::artifact(
                ArtifactKind::Tokenizer,
                &paths.tokenizer,
                format!(
                    "tokenizer emits ids up to {} but the embedding table has {} rows",
                    encoder.id_upper_bound() - 1,
                    model_config.vocab_size
                ),
            ));
        }

        Self::new(encoder, decoder, Box::new(model), config.sequence_width).map_err(|e| {
            MoodError::artifact(ArtifactKind::LabelDecoder, &paths.labels, e.to_string())
        })
    }

    pub fn labels(&self) -> &[String] {
        self.decoder.labels()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Tokenize and normalize `text` to the model's input width.
    pub fn encode(&self, text: &str) -> Result<FixedWidthSequence, MoodError> {
        let ids = self
            .encoder
            .encode(text)
            .map_err(|e| MoodError::Classification(format!("{:#}", e)))?;
        Ok(FixedWidthSequence::fit(ids, self.width, self.encoder.pad_id()))
    }

    fn classify(&self, text: &str) -> Result<Classification, MoodError> {
        let sequence = self.encode(text)?;
        if sequence.is_truncated() {
            debug!(
                "Input truncated to {} tokens ({} dropped)",
                self.width,
                sequence.dropped()
            );
        }

        let probs = self
            .model
            .predict(sequence.ids())
            .map_err(|e| MoodError::Classification(format!("{:#}", e)))?;

        let (index, max_prob) = argmax(&probs).ok_or_else(|| {
            MoodError::Classification("model returned no finite probabilities".to_string())
        })?;

        let label = self.decoder.decode(index).ok_or_else(|| {
            MoodError::Classification(format!(
                "model predicted class {} but only {} labels are known",
                index,
                self.decoder.len()
            ))
        })?;

        Ok(Classification {
            label: label.to_string(),
            confidence: to_percentage(max_prob),
        })
    }
}

/// Index and value of the largest finite probability. The first index wins ties.
fn argmax(probs: &[f32]) -> Option<(usize, f32)> {
    probs
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, p)| p.is_finite())
        .fold(None, |best, (i, p)| match best {
            Some((_, best_p)) if best_p >= p => best,
            _ => Some((i, p)),
        })
}

fn to_percentage(prob: f32) -> f32 {
    let pct = (prob.clamp(0.0, 1.0) as f64) * 100.0;
    ((pct * 100.0).round() / 100.0) as f32
}

enum LoadState {
    Ready(ClassifierArtifacts),
    Degraded(String),
}

/// Handle owning the classifier's one-time artifact load.
///
/// Share it behind an `Arc`; `classify` takes `&self` and needs no lock once
/// loading has completed.
pub struct EmotionClassifier {
    config: ClassifierConfig,
    state: OnceLock<LoadState>,
}

impl EmotionClassifier {
    /// Create a classifier that loads its artifacts on first use.
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            state: OnceLock::new(),
        }
    }

    /// Create a classifier from artifacts that are already in memory.
    pub fn from_artifacts(config: ClassifierConfig, artifacts: ClassifierArtifacts) -> Self {
        Self {
            config,
            state: OnceLock::from(LoadState::Ready(artifacts)),
        }
    }

    fn state(&self) -> &LoadState {
        self.state.get_or_init(|| match ClassifierArtifacts::load(&self.config) {
            Ok(artifacts) => {
                info!(
                    "Emotion classifier loaded ({} labels, width {})",
                    artifacts.labels().len(),
                    artifacts.width()
                );
                LoadState::Ready(artifacts)
            }
            Err(e) => {
                warn!(
                    "Failed to load emotion classifier: {}. Serving placeholder results (fail-open).",
                    e
                );
                LoadState::Degraded(e.to_string())
            }
        })
    }

    /// Load artifacts now if they are not loaded yet. Idempotent.
    pub fn load(&self) -> ClassifierStatus {
        self.state();
        self.status()
    }

    /// Whether real artifacts are loaded. Does not trigger a load.
    pub fn is_ready(&self) -> bool {
        matches!(self.state.get(), Some(LoadState::Ready(_)))
    }

    pub fn status(&self) -> ClassifierStatus {
        match self.state.get() {
            None => ClassifierStatus::Unloaded,
            Some(LoadState::Ready(artifacts)) => ClassifierStatus::Ready {
                labels: artifacts.labels().to_vec(),
            },
            Some(LoadState::Degraded(reason)) => ClassifierStatus::Degraded {
                reason: reason.clone(),
            },
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify one utterance.
    ///
    /// In degraded mode this always succeeds with the placeholder result.
    /// Otherwise a failing forward pass is returned as
    /// [`MoodError::Classification`]; it is never retried.
    pub fn classify(&self, text: &str) -> Result<Classification, MoodError> {
        match self.state() {
            LoadState::Ready(artifacts) => artifacts.classify(text),
            LoadState::Degraded(_) => Ok(Classification::degraded()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use super::*;
    use crate::config::ArtifactPaths;

    struct FixedModel(Vec<f32>);

    impl SequenceModel for FixedModel {
        fn num_labels(&self) -> usize {
            self.0.len()
        }

        fn predict(&self, _sequence: &[u32]) -> anyhow::Result<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    fn encoder() -> TextEncoder {
        let index: HashMap<String, u32> = [("happy", 1), ("sad", 2)]
            .into_iter()
            .map(|(w, i)| (w.to_string(), i))
            .collect();
        WordIndexTokenizer::new(index).into()
    }

    fn decoder() -> LabelDecoder {
        LabelDecoder::new(vec!["anger".into(), "joy".into(), "sadness".into()]).unwrap()
    }

    fn missing_config() -> ClassifierConfig {
        let dir = PathBuf::from("/nonexistent/mindcare-artifacts");
        ClassifierConfig {
            artifacts: ArtifactPaths::in_dir(&dir),
            sequence_width: DEFAULT_SEQUENCE_WIDTH,
        }
    }

    fn ready(probs: Vec<f32>) -> EmotionClassifier {
        let artifacts =
            ClassifierArtifacts::new(encoder(), decoder(), Box::new(FixedModel(probs)), 10)
                .unwrap();
        EmotionClassifier::from_artifacts(ClassifierConfig::default(), artifacts)
    }

    #[test]
    fn test_argmax_first_index_wins_ties() {
        assert_eq!(argmax(&[0.4, 0.4, 0.2]), Some((0, 0.4)));
        assert_eq!(argmax(&[0.1, f32::NAN, 0.3]), Some((2, 0.3)));
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[f32::NAN]), None);
    }

    #[test]
    fn test_percentage_rounds_to_two_decimals() {
        assert_eq!(to_percentage(0.95), 95.0);
        assert_eq!(to_percentage(0.123456), 12.35);
        assert_eq!(to_percentage(1.5), 100.0);
        assert_eq!(to_percentage(-0.1), 0.0);
    }

    #[test]
    fn test_classify_picks_argmax_label() {
        let classifier = ready(vec![0.1, 0.7, 0.2]);
        let result = classifier.classify("so happy").unwrap();
        assert_eq!(result.label, "joy");
        assert_eq!(result.confidence, 70.0);
    }

    #[test]
    fn test_from_artifacts_is_ready_without_load() {
        let classifier = ready(vec![0.1, 0.7, 0.2]);
        assert!(classifier.is_ready());
        assert!(matches!(classifier.status(), ClassifierStatus::Ready { .. }));
    }

    #[test]
    fn test_missing_artifacts_degrade() {
        let classifier = EmotionClassifier::new(missing_config());
        assert_eq!(classifier.status(), ClassifierStatus::Unloaded);
        assert!(!classifier.is_ready());

        let status = classifier.load();
        assert!(matches!(status, ClassifierStatus::Degraded { .. }));
        assert!(!classifier.is_ready());

        let result = classifier.classify("anything").unwrap();
        assert_eq!(result, Classification::degraded());
        assert_eq!(result.label, "joy");
        assert_eq!(result.confidence, 99.9);
    }

    #[test]
    fn test_classify_triggers_lazy_load() {
        let classifier = EmotionClassifier::new(missing_config());
        let _ = classifier.classify("").unwrap();
        assert!(matches!(classifier.status(), ClassifierStatus::Degraded { .. }));
    }

    #[test]
    fn test_label_count_mismatch_rejected() {
        let result = ClassifierArtifacts::new(
            encoder(),
            decoder(),
            Box::new(FixedModel(vec![0.5, 0.5])),
            10,
        );
        assert!(matches!(result, Err(MoodError::Config(_))));
    }

    #[test]
    fn test_zero_width_config_fails_before_reading_artifacts() {
        let config = ClassifierConfig {
            sequence_width: 0,
            ..missing_config()
        };
        assert!(matches!(
            ClassifierArtifacts::load(&config),
            Err(MoodError::Config(_))
        ));

        let classifier = EmotionClassifier::new(config);
        match classifier.load() {
            ClassifierStatus::Degraded { reason } => {
                assert!(reason.starts_with("Configuration error"), "reason: {}", reason);
            }
            other => panic!("expected degraded mode, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_width_rejected() {
        let result = ClassifierArtifacts::new(
            encoder(),
            decoder(),
            Box::new(FixedModel(vec![0.2, 0.3, 0.5])),
            0,
        );
        assert!(matches!(result, Err(MoodError::Config(_))));
    }

    #[test]
    fn test_non_finite_output_is_classification_failure() {
        let classifier = ready(vec![f32::NAN, f32::NAN, f32::NAN]);
        assert!(matches!(
            classifier.classify("sad"),
            Err(MoodError::Classification(_))
        ));
    }
}
