pub mod artifacts;
pub mod services;

// Re-export commonly used test utilities
pub use artifacts::{ArtifactDir, LABELS, WIDTH};
pub use services::{FixedService, ScriptedService};
