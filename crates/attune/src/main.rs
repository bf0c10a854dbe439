//! Compose emotion-aware prompts and relay one-off chats from the terminal.
//!
//! Reads the API key from the `OPENROUTER_KEY` environment variable.
//!
//! # Examples
//!
//! ```sh
//! # Print the system prompt a window of readings produces
//! attune compose --emotions readings.json
//!
//! # Send one message through the relay
//! attune chat --user "Rough day at work." --emotions readings.json
//!
//! # Show the exact conversation that would be sent, without calling the API
//! attune chat --user "Hi" --emotions readings.json --dry-run
//! ```
//!
//! `readings.json` holds a JSON array of observations, oldest first:
//!
//! ```json
//! [{"dominantEmotion": "sad", "confidence": 71, "emotionScores": {"sad": 0.71}}]
//! ```

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use attune::prelude::*;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "attune", about = "Emotion-aware prompt composer and chat relay")]
struct Cli {
    /// Log request details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the system prompt composed from a window of emotion readings
    Compose {
        /// JSON file with an array of emotion observations
        #[arg(long)]
        emotions: Option<PathBuf>,
    },
    /// Relay a single user message and print the reply
    Chat {
        /// User message to send
        #[arg(long)]
        user: String,

        /// JSON file with an array of emotion observations
        #[arg(long)]
        emotions: Option<PathBuf>,

        /// Model to use
        #[arg(long, default_value = attune::DEFAULT_MODEL)]
        model: String,

        /// Maximum tokens in the reply
        #[arg(long, default_value_t = attune::DEFAULT_MAX_TOKENS)]
        max_tokens: u32,

        /// Sampling temperature
        #[arg(long, default_value_t = attune::DEFAULT_TEMPERATURE)]
        temperature: f32,

        /// Print the assembled conversation as JSON instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "attune=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli.command).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Compose { emotions } => {
            let window = emotions.as_deref().map(load_window).transpose()?;
            println!("{}", compose(window.as_ref()));
            Ok(())
        }
        Command::Chat {
            user,
            emotions,
            model,
            max_tokens,
            temperature,
            dry_run,
        } => {
            let mut input = ChatInput::new(vec![Message::user(user)]);
            if let Some(path) = emotions {
                input = input.with_emotions(load_window(&path)?);
            }

            if dry_run {
                let (conversation, _) = attune::relay::prepare(&input);
                let json = serde_json::to_string_pretty(&conversation)
                    .map_err(|e| format!("failed to serialize conversation: {e}"))?;
                println!("{json}");
                return Ok(());
            }

            let config = ProviderConfig::from_env()?
                .with_model(model)
                .with_max_tokens(max_tokens)
                .with_temperature(temperature);
            let relay = Relay::new(Arc::new(OpenRouterClient::new(config)?));
            let reply = relay.handle(input).await.map_err(|e| e.to_string())?;
            println!("{}", reply.message);
            Ok(())
        }
    }
}

/// Read an emotion window from a JSON file.
fn load_window(path: &Path) -> Result<EmotionWindow, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid emotion data in {}: {e}", path.display()))
}
