//! MindCare - emotion classifier with empathetic replies
//!
//! Usage:
//!   mindcare analyze "text"      Classify one utterance
//!   mindcare chat                Interactive conversation
//!   mindcare status              Artifact and classifier state
//!   mindcare labels              Canned responses per label
//!   mindcare --help              Show all commands

use anyhow::Result;
use clap::Parser;

use mindcare::cli::output::OutputMode;
use mindcare::cli::Cli;
use mindcare::init::AppContext;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Tracing to stderr so stdout stays clean for --json
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mindcare=info".parse()?),
        )
        .init();

    let mode = OutputMode::from_json_flag(cli.json);
    let ctx = AppContext::new(cli.data_path.clone());

    mindcare::cli::execute(&cli.command, &ctx, mode).await?;

    Ok(())
}
