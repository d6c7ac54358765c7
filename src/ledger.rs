//! Conversation ledger: the session's history of classified turns.
//!
//! Turns are immutable once recorded and are always read newest-first. The
//! ledger only grows: there is no eviction, update, or deletion, so memory use
//! is unbounded for the life of a session.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::ResponseEntry;
use crate::classifier::Classification;

/// One completed utterance → response cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    user_text: String,
    label: String,
    confidence: f32,
    glyph: String,
    message: String,
    recorded_at: DateTime<Utc>,
}

impl Turn {
    pub fn user_text(&self) -> &str {
        &self.user_text
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn glyph(&self) -> &str {
        &self.glyph
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// Ordered record of a session's turns.
#[derive(Debug, Clone, Default)]
pub struct ConversationLedger {
    /// Chronological; reads reverse it.
    turns: Vec<Turn>,
}

impl ConversationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a turn as the new head of the ledger.
    ///
    /// Identical inputs are recorded again, never merged.
    pub fn record(
        &mut self,
        user_text: impl Into<String>,
        classification: &Classification,
        response: &ResponseEntry,
    ) -> &Turn {
        let turn = Turn {
            user_text: user_text.into(),
            label: classification.label.clone(),
            confidence: classification.confidence,
            glyph: response.glyph.to_string(),
            message: response.message.to_string(),
            recorded_at: Utc::now(),
        };
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }

    /// Turns, newest first.
    pub fn list(&self) -> impl ExactSizeIterator<Item = &Turn> + DoubleEndedIterator + '_ {
        self.turns.iter().rev()
    }

    /// Turn at `index` in newest-first order.
    pub fn get(&self, index: usize) -> Option<&Turn> {
        let len = self.turns.len();
        if index >= len {
            return None;
        }
        self.turns.get(len - 1 - index)
    }

    pub fn latest(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Owned copy of the history, newest first.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.list().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
