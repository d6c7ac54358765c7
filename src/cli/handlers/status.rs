//! Status and catalog command handlers.

use anyhow::Result;
use serde::Serialize;

use crate::classifier::ClassifierStatus;
use crate::cli::output::{output_json, print_header, print_kv, print_table, OutputMode};
use crate::config::ClassifierConfig;
use crate::init::AppContext;

#[derive(Serialize)]
struct StatusOutput<'a> {
    data_path: String,
    config: &'a ClassifierConfig,
    classifier: ClassifierStatus,
}

pub async fn handle_status(ctx: &AppContext, mode: OutputMode) -> Result<()> {
    ctx.warm_up().await;
    let status = ctx.classifier.status();

    if mode == OutputMode::Json {
        output_json(&StatusOutput {
            data_path: ctx.data_path.display().to_string(),
            config: &ctx.config,
            classifier: status,
        });
        return Ok(());
    }

    print_header("Classifier");
    print_kv("Data path", &ctx.data_path.display().to_string());
    print_kv("Sequence width", &ctx.config.sequence_width.to_string());

    let artifacts = &ctx.config.artifacts;
    print_kv("Model config", &artifacts.model_config.display().to_string());
    print_kv("Model weights", &artifacts.model_weights.display().to_string());
    print_kv("Tokenizer", &artifacts.tokenizer.display().to_string());
    print_kv("Labels", &artifacts.labels.display().to_string());

    match status {
        ClassifierStatus::Ready { labels } => {
            print_kv("State", "ready");
            print_kv("Model labels", &labels.join(", "));
        }
        ClassifierStatus::Degraded { reason } => {
            print_kv("State", "degraded (placeholder answers)");
            print_kv("Reason", &reason);
        }
        ClassifierStatus::Unloaded => print_kv("State", "not loaded"),
    }

    Ok(())
}

pub fn handle_labels(ctx: &AppContext, mode: OutputMode) -> Result<()> {
    if mode == OutputMode::Json {
        let entries: Vec<_> = ctx
            .catalog
            .entries()
            .map(|(emotion, entry)| serde_json::json!({ "label": emotion, "response": entry }))
            .collect();
        output_json(&serde_json::json!({
            "entries": entries,
            "fallback": ctx.catalog.fallback(),
        }));
        return Ok(());
    }

    let mut rows: Vec<Vec<String>> = ctx
        .catalog
        .entries()
        .map(|(emotion, entry)| {
            vec![
                emotion.to_string(),
                entry.glyph.to_string(),
                entry.message.to_string(),
            ]
        })
        .collect();
    let fallback = ctx.catalog.fallback();
    rows.push(vec![
        "(other)".to_string(),
        fallback.glyph.to_string(),
        fallback.message.to_string(),
    ]);

    print_table(&["Label", "Glyph", "Response"], rows);
    Ok(())
}
