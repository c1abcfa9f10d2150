use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use llamadesk_core::completion::{CompletionModel, GenerateSettings};
use llamadesk_core::config::{Config, ModeConfig, load_config};
use llamadesk_core::get_completion_llm;
use std::path::PathBuf;

use crate::log::setup_logging;

pub mod chat;
pub mod image;
pub mod meme;
pub mod site;

/// llamadesk - a local LLM assistant.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Show verbose logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Chat with the local model.
    Chat {
        /// Sampling temperature (0.1 to 2.0).
        #[arg(short, long)]
        temperature: Option<f32>,
    },
    /// Fetch a web page and summarize its content.
    Site {
        /// Website URL to analyze.
        #[arg(default_value = "https://example.com")]
        url: String,
    },
    /// Extract text from an image and summarize it.
    Image(image::ImageArgs),
    /// Create memes from popular templates.
    #[command(subcommand)]
    Meme(meme::MemeCommand),
}

const OVERVIEW: &str = "\
Available features:

  chat    Interactive chat with your local model.
  site    Enter any website URL to get an AI analysis of its content.
  image   Extract the text in an image and get it summarized.
  meme    Create custom memes using popular templates.

Run `llamadesk <command> --help` for the options of each tool.";

/// Builds the model used for one-shot analysis tasks.
pub(crate) fn task_model(mode: &ModeConfig) -> Result<(Box<dyn CompletionModel + Send + Sync>, GenerateSettings)> {
    let model = get_completion_llm(mode.model.clone()).context("Failed to initialize model")?;
    let settings = GenerateSettings {
        temperature: mode.temperature,
    };
    Ok((model, settings))
}

async fn dispatch(command: Option<Commands>, config: &Config) -> Result<()> {
    match command {
        None => {
            println!("{OVERVIEW}");
            Ok(())
        }
        Some(Commands::Chat { temperature }) => chat::execute(config, temperature).await,
        Some(Commands::Site { url }) => site::execute(&url, config).await,
        Some(Commands::Image(args)) => image::execute(args, config).await,
        Some(Commands::Meme(command)) => meme::execute(command, config).await,
    }
}

pub async fn run_app() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        setup_logging().context("Failed to set up logging")?;
    }

    let config = load_config(cli.config).context("Failed to load configuration")?;
    dispatch(cli.command, &config).await
}
