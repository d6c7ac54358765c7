//! CLI command handlers.

pub mod analyze;
pub mod chat;
pub mod status;
