use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which of the three classifier artifacts an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    ModelConfig,
    ModelWeights,
    Tokenizer,
    LabelDecoder,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::ModelConfig => "model config",
            ArtifactKind::ModelWeights => "model weights",
            ArtifactKind::Tokenizer => "tokenizer",
            ArtifactKind::LabelDecoder => "label decoder",
        };
        f.write_str(name)
    }
}

/// Custom error type for MindCare operations.
#[derive(Debug, Error)]
pub enum MoodError {
    /// A model, tokenizer or label-decoder artifact is missing, corrupt, or
    /// inconsistent with the others.
    #[error("Failed to load {artifact} from '{}': {message}", path.display())]
    ArtifactLoad {
        artifact: ArtifactKind,
        path: PathBuf,
        message: String,
    },

    /// The forward pass or label decoding failed for a single utterance.
    #[error("Classification failed: {0}")]
    Classification(String),

    /// Input validation failed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MoodError {
    pub(crate) fn artifact(
        artifact: ArtifactKind,
        path: impl Into<PathBuf>,
        err: impl fmt::Display,
    ) -> Self {
        MoodError::ArtifactLoad {
            artifact,
            path: path.into(),
            message: err.to_string(),
        }
    }
}
