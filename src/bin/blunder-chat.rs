//! Interactive chat with the Worst AI Ever.
//!
//! This binary provides a streaming REPL in which every question gets a
//! confidently wrong answer from a Gemini model.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! GEMINI_API_KEY=... blunder-chat
//!
//! # Specify a model
//! blunder-chat --model gemini-2.5-flash
//!
//! # Disable colors (useful for piping output)
//! blunder-chat --no-color
//! ```
//!
//! Set `RUST_LOG=blunder=debug` to see request and stream diagnostics on
//! stderr.

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use blunder::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, TurnOutcome,
    help_text, parse_command,
};
use blunder::Gemini;
use blunder::persona::CLEAR_CONFIRMATION;

/// Main entry point for the blunder-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("blunder-chat [OPTIONS]");
    let config = ChatConfig::from(args);
    let use_color = config.use_color;

    let client = Gemini::with_options(None, config.base_url.clone(), config.timeout)?;
    let mut session = ChatSession::new(client, config);
    session.subscribe(PlainTextRenderer::with_color(use_color));
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;

    println!("Worst AI Ever (model: {})", session.model());
    println!("Type /help for commands, /quit to exit\n");
    for message in session.messages() {
        renderer.print_message(message);
    }

    loop {
        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Clear => {
                            if confirm(&mut rl, CLEAR_CONFIRMATION)? {
                                renderer.print_info("Conversation cleared.");
                                session.clear();
                            }
                        }
                        ChatCommand::History => {
                            for message in session.messages() {
                                renderer.print_message(message);
                            }
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Stats => {
                            print_stats(&session);
                        }
                        ChatCommand::ShowConfig => {
                            print_config(&session);
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                match session.submit(line).await {
                    Ok(TurnOutcome::Completed { .. }) => {}
                    Ok(TurnOutcome::Failed { error, .. }) => {
                        tracing::debug!(error = %error, "reply replaced by failure text");
                    }
                    Err(e) => renderer.print_error(&e.to_string()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

/// Asks a yes/no question; anything but "y" or "yes" is a no.
fn confirm(rl: &mut DefaultEditor, question: &str) -> Result<bool, ReadlineError> {
    match rl.readline(&format!("{question} [y/N] ")) {
        Ok(answer) => Ok(matches!(
            answer.trim().to_lowercase().as_str(),
            "y" | "yes"
        )),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(false),
        Err(err) => Err(err),
    }
}

fn print_stats(session: &ChatSession) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Model: {}", stats.model);
    println!("      Messages: {}", stats.message_count);
    println!("      Turns completed: {}", stats.turns_completed);
    println!("      Turns failed: {}", stats.turns_failed);
    println!("      Chunks received: {}", stats.chunks_received);
}

fn print_config(session: &ChatSession) {
    let config = session.config();
    println!("    Configuration:");
    println!("      Model: {}", config.model);
    println!("      Temperature: {:.2}", config.temperature);
    match config.thinking_budget {
        Some(0) => println!("      Thinking: disabled"),
        Some(budget) => println!("      Thinking budget: {budget} tokens"),
        None => println!("      Thinking: model default"),
    }
    println!(
        "      Base URL: {}",
        config.base_url.as_deref().unwrap_or("(default)")
    );
    if let Some(timeout) = config.timeout {
        println!("      Timeout: {}s", timeout.as_secs());
    }
    println!("      Colors: {}", if config.use_color { "on" } else { "off" });
}
