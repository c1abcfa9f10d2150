use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use llamadesk_core::completion::GenerateSettings;
use llamadesk_core::config::Config;
use llamadesk_core::session::{ChatSession, Transcript};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::ux::{GenerationSpinner, MessageType, format_footer_metrics, style_text};

// -------------
// REPL commands
// -------------
#[derive(Parser, Debug)]
#[command(multicall = true)]
struct ChatCommand {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Clear chat history
    Clear,
    /// Show the conversation so far
    History,
    /// Show or set the sampling temperature (0.1 to 2.0)
    #[command(alias = "temp")]
    Temperature {
        /// New temperature
        value: Option<f32>,
    },
    /// Exit the chat session
    #[command(alias = "q", alias = "quit")]
    Exit,
}

impl Command {
    /// Executes a REPL command.
    ///
    /// Returns `Ok(false)` if the REPL should exit.
    fn execute(self, session: &mut ChatSession) -> Result<bool> {
        match self {
            Command::Clear => {
                session.clear();
                println!("Chat history cleared");
            }
            Command::History => {
                println!("{}", format_history(session.transcript()));
            }
            Command::Temperature { value: None } => {
                println!("Temperature: {}", session.settings().temperature);
            }
            Command::Temperature { value: Some(value) } => {
                session.set_temperature(value)?;
                println!("Temperature set to {value}");
            }
            Command::Exit => {
                println!("Bye!");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn parse_command(line: &str) -> Result<Command, clap::Error> {
    let line = line.strip_prefix('/').unwrap_or(line);
    let args = shlex::split(line).unwrap_or_default();
    ChatCommand::try_parse_from(args).map(|c| c.command)
}

fn format_history(transcript: &Transcript) -> String {
    if transcript.is_empty() {
        return "No messages yet.".to_string();
    }
    transcript
        .messages()
        .iter()
        .map(|m| format!("[{}] {}: {}", m.timestamp.format("%H:%M:%S"), m.sender.as_str(), m.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Sends one prompt and prints the reply, or the error inline.
async fn process_message(session: &mut ChatSession, prompt: &str) {
    let spinner = GenerationSpinner::new("Generating...".to_string());
    let result = session.send(prompt).await;
    spinner.clear();

    match result {
        Ok(response) => {
            println!("\n{}", response.text);
            println!(
                "\n{}",
                format_footer_metrics(&response.metrics, response.finish_reason.as_deref())
            );
        }
        Err(e) => {
            let message = format!("Error connecting to Ollama: {e:#}");
            eprintln!("{}", style_text(&message, MessageType::Error));
        }
    }
}

async fn run(session: &mut ChatSession) -> Result<()> {
    println!("Welcome to llamadesk chat! Type '/help' for commands, '/q' to exit.");
    let mut rl = DefaultEditor::new().context("Failed to start line editor")?;

    loop {
        let prompt_meta = format!(
            "[model: {} | temperature: {}]",
            session.model_name(),
            session.settings().temperature
        );
        let prompt = format!(
            "\n{}\n{}",
            style_text(&prompt_meta, MessageType::Prompt),
            style_text("> ", MessageType::Prompt)
        );

        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed_line = line.trim();
                if trimmed_line.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed_line)?;

                if trimmed_line.starts_with('/') {
                    match parse_command(trimmed_line) {
                        Ok(command) => match command.execute(session) {
                            Ok(true) => {}
                            Ok(false) => return Ok(()),
                            Err(e) => eprintln!("{}", style_text(&e.to_string(), MessageType::Error)),
                        },
                        Err(e) => {
                            e.print()?;
                        }
                    }
                } else {
                    process_message(session, trimmed_line).await;
                    debug!(turns = session.transcript().len(), "Processed chat message");
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Type /quit to exit.");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nBye!");
                return Ok(());
            }
            Err(err) => {
                return Err(err.into());
            }
        }
    }
}

/// Starts a session at the `--temperature` override, else the configured one.
fn new_session(config: &Config, temperature: Option<f32>) -> Result<ChatSession> {
    let settings = GenerateSettings {
        temperature: temperature.unwrap_or(config.chat.temperature),
    };
    ChatSession::new(config.chat.model.clone(), settings).context("Failed to start chat session")
}

pub async fn execute(config: &Config, temperature: Option<f32>) -> Result<()> {
    let mut session = new_session(config, temperature)?;
    run(&mut session).await
}
