//! CLI interface for MindCare.

pub mod handlers;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use output::OutputMode;

/// MindCare - emotion classifier with empathetic replies
#[derive(Parser)]
#[command(name = "mindcare", version, about, long_about = None)]
pub struct Cli {
    /// Override data directory holding the model artifacts (default: ~/.mindcare)
    #[arg(long, env = "MINDCARE_DATA_PATH", global = true)]
    pub data_path: Option<PathBuf>,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a single utterance and print the response
    Analyze {
        /// Text to analyze
        text: String,
    },

    /// Interactive conversation; history is shown newest first
    Chat,

    /// Show artifact locations and classifier state
    Status,

    /// List the labels that have canned responses
    Labels,
}

pub async fn execute(
    command: &Commands,
    ctx: &crate::init::AppContext,
    mode: OutputMode,
) -> anyhow::Result<()> {
    match command {
        Commands::Analyze { text } => handlers::analyze::handle_analyze(ctx, text, mode).await?,
        Commands::Chat => handlers::chat::handle_chat(ctx, mode).await?,
        Commands::Status => handlers::status::handle_status(ctx, mode).await?,
        Commands::Labels => handlers::status::handle_labels(ctx, mode)?,
    }

    Ok(())
}
