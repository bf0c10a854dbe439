//! attune relay server.
//!
//! # Usage
//!
//! ```bash
//! OPENROUTER_KEY=sk-... cargo run -p attune-web
//! OPENROUTER_KEY=sk-... cargo run -p attune-web -- --model openai/gpt-4o --port 8080
//! OPENROUTER_KEY=sk-... ATTUNE_ALLOWED_ORIGINS=https://app.example.com cargo run -p attune-web
//! ```
//!
//! Then send a conversation:
//!
//! ```bash
//! curl -s localhost:3001/api/chat -H 'content-type: application/json' -d '{
//!   "messages": [{"role": "user", "content": "Hello"}],
//!   "emotions": [{"dominantEmotion": "happy", "confidence": 92}]
//! }'
//! ```

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use attune::client::OpenRouterClient;
use attune::config::ProviderConfig;
use attune::relay::Relay;
use attune_web::{WebConfig, spawn_web};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Emotion-aware chat relay server.
#[derive(Parser)]
#[command(about = "Relay chat requests to an LLM with emotion-aware system prompts")]
struct Args {
    /// API key for the chat-completions provider.
    #[arg(long, env = "OPENROUTER_KEY", hide_env_values = true)]
    api_key: String,

    /// Address to bind to.
    #[arg(long, env = "ATTUNE_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3001)]
    port: u16,

    /// Chat-completions endpoint.
    #[arg(long, env = "ATTUNE_ENDPOINT", default_value = attune::OPENROUTER_URL)]
    endpoint: String,

    /// LLM model to use.
    #[arg(long, env = "ATTUNE_MODEL", default_value = attune::DEFAULT_MODEL)]
    model: String,

    /// Maximum tokens per reply.
    #[arg(long, default_value_t = attune::DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    /// Sampling temperature.
    #[arg(long, default_value_t = attune::DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Provider request timeout in seconds.
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// Origin allowed to call the API from a browser (repeatable, `*` for any).
    #[arg(
        long = "allowed-origin",
        env = "ATTUNE_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_values_t = WebConfig::default().allowed_origins
    )]
    allowed_origins: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,attune=debug,attune_web=debug"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 1. Provider client from explicit configuration.
    let provider_config = ProviderConfig::new(args.api_key)
        .with_endpoint(args.endpoint)
        .with_model(args.model)
        .with_max_tokens(args.max_tokens)
        .with_temperature(args.temperature)
        .with_timeout(Duration::from_secs(args.timeout_secs));
    info!("Provider: {provider_config:?}");
    let client = OpenRouterClient::new(provider_config)?;

    // 2. Relay shared by every request.
    let relay = Relay::new(Arc::new(client));

    // 3. Serve.
    let web_config = WebConfig {
        bind_addr: SocketAddr::new(args.host, args.port),
        allowed_origins: args.allowed_origins,
    };
    info!("Allowed origins: {:?}", web_config.allowed_origins);
    let addr = spawn_web(relay, web_config).await?;
    info!("attune relay listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("failed to listen for shutdown signal: {e}"))?;
    info!("Shutting down");
    Ok(())
}
