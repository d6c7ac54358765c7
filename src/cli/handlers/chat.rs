//! Interactive chat command handler.

use anyhow::{Context, Result};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::cli::output::{output_json, print_error, print_header, print_hint, print_turn, OutputMode};
use crate::init::AppContext;
use crate::session::ChatSession;
use crate::MoodError;

const PROMPT: &str = "> ";

enum ChatCommand<'a> {
    Quit,
    History,
    Say(&'a str),
    Blank,
}

fn parse_line(line: &str) -> ChatCommand<'_> {
    match line.trim() {
        "/quit" | "/exit" => ChatCommand::Quit,
        "/history" => ChatCommand::History,
        "" => ChatCommand::Blank,
        _ => ChatCommand::Say(line.trim_end_matches(['\r', '\n'])),
    }
}

fn print_history(session: &ChatSession, mode: OutputMode) {
    if mode == OutputMode::Json {
        output_json(&session.ledger().snapshot());
        return;
    }

    if session.ledger().is_empty() {
        print_hint("No turns yet.");
        return;
    }
    for turn in session.turns() {
        let accent = session.catalog().lookup(turn.label()).accent;
        print_turn(turn, Some(accent));
    }
}

pub async fn handle_chat(ctx: &AppContext, mode: OutputMode) -> Result<()> {
    if !ctx.warm_up().await {
        print_hint("Model artifacts unavailable; running in placeholder mode.");
    }

    let mut session = ctx.new_session();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    if mode == OutputMode::Human {
        print_header("MindCare AI");
        print_hint("Type your thoughts (e.g. I finally achieved my goal!). /history, /quit");
    }

    loop {
        if mode == OutputMode::Human {
            stdout.write_all(PROMPT.cyan().to_string().as_bytes()).await?;
            stdout.flush().await?;
        }

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        match parse_line(&line) {
            ChatCommand::Quit => break,
            ChatCommand::Blank => continue,
            ChatCommand::History => print_history(&session, mode),
            ChatCommand::Say(text) => match session.submit(text).await {
                Ok(turn) => {
                    if mode == OutputMode::Json {
                        output_json(turn);
                    } else {
                        println!();
                        print_history(&session, mode);
                    }
                }
                Err(MoodError::Validation(msg)) => print_error(&msg),
                Err(e) => return Err(anyhow::anyhow!("Chat failed: {}", e)),
            },
        }
    }

    Ok(())
}
