//! Async emotion classification service.
//!
//! Wraps the blocking [`EmotionClassifier`] so async callers can classify
//! without stalling the runtime: each forward pass runs on the blocking pool.

use std::sync::Arc;

use async_trait::async_trait;

use crate::classifier::{Classification, ClassifierStatus, EmotionClassifier};
use crate::MoodError;

/// Service trait for emotion classification.
#[async_trait]
pub trait EmotionService: Send + Sync {
    /// Classify one utterance.
    async fn classify_text(&self, text: &str) -> Result<Classification, MoodError>;

    /// Whether real model artifacts are loaded (false while unloaded or degraded).
    fn is_available(&self) -> bool;

    /// Current classifier lifecycle state.
    fn status(&self) -> ClassifierStatus;
}

/// Local emotion service backed by an in-process classifier.
pub struct LocalEmotionService {
    classifier: Arc<EmotionClassifier>,
}

impl LocalEmotionService {
    pub fn new(classifier: Arc<EmotionClassifier>) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &Arc<EmotionClassifier> {
        &self.classifier
    }
}

#[async_trait]
impl EmotionService for LocalEmotionService {
    async fn classify_text(&self, text: &str) -> Result<Classification, MoodError> {
        let classifier = self.classifier.clone();
        let text_owned = text.to_string();

        tokio::task::spawn_blocking(move || classifier.classify(&text_owned))
            .await
            .map_err(|e| MoodError::Classification(format!("Task join error: {}", e)))?
    }

    fn is_available(&self) -> bool {
        self.classifier.is_ready()
    }

    fn status(&self) -> ClassifierStatus {
        self.classifier.status()
    }
}
