//! Shared initialization for CLI commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::ResponseCatalog;
use crate::classifier::EmotionClassifier;
use crate::config::{load_classifier_config, ClassifierConfig};
use crate::service::{EmotionService, LocalEmotionService};
use crate::session::ChatSession;

/// Application context holding the shared classifier and catalog.
pub struct AppContext {
    pub data_path: PathBuf,
    pub config: ClassifierConfig,
    pub classifier: Arc<EmotionClassifier>,
    pub emotion_service: Arc<dyn EmotionService>,
    pub catalog: ResponseCatalog,
}

impl AppContext {
    /// Initialize application context. Artifacts are not read until
    /// [`AppContext::warm_up`] or the first classification.
    ///
    /// Data path priority: explicit path > MINDCARE_DATA_PATH env > ./.mindcare (if exists) > ~/.mindcare
    pub fn new(explicit_path: Option<PathBuf>) -> Self {
        let data_path = resolve_data_path(explicit_path);
        tracing::info!("Using data path: {}", data_path.display());

        let config = load_classifier_config(&data_path);
        Self::with_config(data_path, config)
    }

    pub fn with_config(data_path: PathBuf, config: ClassifierConfig) -> Self {
        let classifier = Arc::new(EmotionClassifier::new(config.clone()));
        let emotion_service: Arc<dyn EmotionService> =
            Arc::new(LocalEmotionService::new(classifier.clone()));

        Self {
            data_path,
            config,
            classifier,
            emotion_service,
            catalog: ResponseCatalog::new(),
        }
    }

    /// Load artifacts on a blocking thread and report whether they are usable.
    pub async fn warm_up(&self) -> bool {
        let classifier = self.classifier.clone();
        match tokio::task::spawn_blocking(move || classifier.load()).await {
            Ok(_) => {}
            Err(e) => tracing::error!("Classifier warm-up task failed: {}", e),
        }

        if self.emotion_service.is_available() {
            tracing::info!("Emotion classifier ready");
        } else {
            tracing::warn!("Emotion classifier not available, answers are placeholders");
        }
        self.emotion_service.is_available()
    }

    /// Start a fresh conversation sharing this context's classifier.
    pub fn new_session(&self) -> ChatSession {
        ChatSession::new(self.emotion_service.clone(), self.catalog)
    }
}

fn resolve_data_path(explicit_path: Option<PathBuf>) -> PathBuf {
    explicit_path
        .or_else(|| std::env::var("MINDCARE_DATA_PATH").ok().map(PathBuf::from))
        .or_else(|| {
            let local_path = Path::new(".mindcare");
            if local_path.exists() && local_path.is_dir() {
                Some(local_path.to_path_buf())
            } else {
                None
            }
        })
        .unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".mindcare"))
                .unwrap_or_else(|| PathBuf::from(".mindcare"))
        })
}
