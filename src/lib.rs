pub mod catalog;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod init;
pub mod ledger;
pub mod service;
pub mod session;

pub use catalog::{CatalogMatch, Emotion, ResponseCatalog, ResponseEntry};
pub use classifier::{Classification, ClassifierStatus, EmotionClassifier};
pub use error::MoodError;
pub use ledger::{ConversationLedger, Turn};
