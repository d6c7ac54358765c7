//! Stub emotion services for session tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use mindcare::classifier::{Classification, ClassifierStatus};
use mindcare::service::EmotionService;
use mindcare::MoodError;

/// Always answers with the same classification.
pub struct FixedService {
    pub label: String,
    pub confidence: f32,
}

impl FixedService {
    pub fn new(label: &str, confidence: f32) -> Self {
        Self {
            label: label.to_string(),
            confidence,
        }
    }
}

#[async_trait]
impl EmotionService for FixedService {
    async fn classify_text(&self, _text: &str) -> Result<Classification, MoodError> {
        Ok(Classification {
            label: self.label.clone(),
            confidence: self.confidence,
        })
    }

    fn is_available(&self) -> bool {
        true
    }

    fn status(&self) -> ClassifierStatus {
        ClassifierStatus::Ready {
            labels: vec![self.label.clone()],
        }
    }
}

/// Answers with queued labels in order, then fails.
pub struct ScriptedService {
    queue: Mutex<VecDeque<(String, f32)>>,
}

impl ScriptedService {
    pub fn new(script: &[(&str, f32)]) -> Self {
        Self {
            queue: Mutex::new(
                script
                    .iter()
                    .map(|(label, confidence)| (label.to_string(), *confidence))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl EmotionService for ScriptedService {
    async fn classify_text(&self, _text: &str) -> Result<Classification, MoodError> {
        let next = self.queue.lock().expect("script lock").pop_front();
        match next {
            Some((label, confidence)) => Ok(Classification { label, confidence }),
            None => Err(MoodError::Classification("script exhausted".to_string())),
        }
    }

    fn is_available(&self) -> bool {
        true
    }

    fn status(&self) -> ClassifierStatus {
        ClassifierStatus::Ready { labels: Vec::new() }
    }
}
