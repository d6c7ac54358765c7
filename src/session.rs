//! Chat session: classify → look up response → record turn.

use std::sync::Arc;

use tracing::warn;

use crate::catalog::ResponseCatalog;
use crate::classifier::Classification;
use crate::ledger::{ConversationLedger, Turn};
use crate::service::EmotionService;
use crate::MoodError;

/// Label recorded when classification of a turn fails.
pub const UNCLASSIFIED_LABEL: &str = "unknown";

/// One user's conversation. Owns its ledger; shares the classifier.
pub struct ChatSession {
    service: Arc<dyn EmotionService>,
    catalog: ResponseCatalog,
    ledger: ConversationLedger,
}

impl ChatSession {
    pub fn new(service: Arc<dyn EmotionService>, catalog: ResponseCatalog) -> Self {
        Self {
            service,
            catalog,
            ledger: ConversationLedger::new(),
        }
    }

    /// Analyze an utterance and record it as the newest turn.
    ///
    /// Blank input is rejected before it reaches the classifier. That includes
    /// whitespace-only text, which is stricter than rejecting only the empty
    /// string: such turns would carry no words for the model to read. A failed
    /// classification is recorded with the fallback response rather than
    /// returned as an error.
    pub async fn submit(&mut self, text: &str) -> Result<&Turn, MoodError> {
        if text.trim().is_empty() {
            return Err(MoodError::Validation(
                "utterance must not be empty".to_string(),
            ));
        }

        let classification = match self.service.classify_text(text).await {
            Ok(classification) => classification,
            Err(MoodError::Classification(reason)) => {
                warn!("Classification failed, recording fallback response: {}", reason);
                Classification {
                    label: UNCLASSIFIED_LABEL.to_string(),
                    confidence: 0.0,
                }
            }
            Err(e) => return Err(e),
        };

        let response = self.catalog.lookup(&classification.label);
        Ok(self.ledger.record(text, &classification, response))
    }

    /// Turns, newest first.
    pub fn turns(&self) -> impl ExactSizeIterator<Item = &Turn> + '_ {
        self.ledger.list()
    }

    pub fn ledger(&self) -> &ConversationLedger {
        &self.ledger
    }

    pub fn catalog(&self) -> &ResponseCatalog {
        &self.catalog
    }

    pub fn service(&self) -> &Arc<dyn EmotionService> {
        &self.service
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::classifier::ClassifierStatus;

    struct FailingService;

    #[async_trait]
    impl EmotionService for FailingService {
        async fn classify_text(&self, _text: &str) -> Result<Classification, MoodError> {
            Err(MoodError::Classification("forward pass exploded".to_string()))
        }

        fn is_available(&self) -> bool {
            true
        }

        fn status(&self) -> ClassifierStatus {
            ClassifierStatus::Unloaded
        }
    }

    struct ConfigBrokenService;

    #[async_trait]
    impl EmotionService for ConfigBrokenService {
        async fn classify_text(&self, _text: &str) -> Result<Classification, MoodError> {
            Err(MoodError::Config("bad width".to_string()))
        }

        fn is_available(&self) -> bool {
            false
        }

        fn status(&self) -> ClassifierStatus {
            ClassifierStatus::Unloaded
        }
    }

    #[tokio::test]
    async fn test_blank_submission_rejected() {
        let mut session = ChatSession::new(Arc::new(FailingService), ResponseCatalog::new());
        for text in ["", "   ", "\n\t"] {
            assert!(matches!(
                session.submit(text).await,
                Err(MoodError::Validation(_))
            ));
        }
        assert!(session.ledger().is_empty());
    }

    #[tokio::test]
    async fn test_classification_failure_records_fallback() {
        let mut session = ChatSession::new(Arc::new(FailingService), ResponseCatalog::new());
        let turn = session.submit("something odd").await.unwrap().clone();

        assert_eq!(turn.label(), UNCLASSIFIED_LABEL);
        assert_eq!(turn.confidence(), 0.0);
        assert_eq!(turn.glyph(), "🤔");
        assert_eq!(session.turns().len(), 1);
    }

    #[tokio::test]
    async fn test_other_errors_propagate() {
        let mut session =
            ChatSession::new(Arc::new(ConfigBrokenService), ResponseCatalog::new());
        assert!(matches!(
            session.submit("hello").await,
            Err(MoodError::Config(_))
        ));
        assert!(session.ledger().is_empty());
    }
}
