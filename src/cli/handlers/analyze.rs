//! One-shot analysis command handler.

use anyhow::Result;
use serde::Serialize;

use crate::catalog::ResponseEntry;
use crate::classifier::Classification;
use crate::cli::output::{output_json, print_turn, OutputMode};
use crate::init::AppContext;

#[derive(Serialize)]
struct AnalysisOutput<'a> {
    text: &'a str,
    #[serde(flatten)]
    classification: Classification,
    response: &'a ResponseEntry,
    fallback: bool,
}

pub async fn handle_analyze(ctx: &AppContext, text: &str, mode: OutputMode) -> Result<()> {
    let mut session = ctx.new_session();
    let turn = session
        .submit(text)
        .await
        .map_err(|e| anyhow::anyhow!("Analysis failed: {}", e))?;

    let resolved = ctx.catalog.resolve(turn.label());

    if mode == OutputMode::Json {
        output_json(&AnalysisOutput {
            text,
            classification: Classification {
                label: turn.label().to_string(),
                confidence: turn.confidence(),
            },
            response: resolved.entry(),
            fallback: resolved.is_fallback(),
        });
        return Ok(());
    }

    print_turn(turn, Some(resolved.entry().accent));
    Ok(())
}
