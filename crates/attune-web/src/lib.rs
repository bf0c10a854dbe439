//! HTTP front end for the attune relay.
//!
//! `attune-web` exposes [`Relay`](attune::relay::Relay) over a small axum
//! API:
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST /api/chat` | `{"messages": [...], "emotions": [...]?}` → `{"message": ...}` |
//! | `GET /health` | Liveness |
//! | `GET /api/test` | Readiness smoke test, reports the configured model |
//!
//! Errors are `{"error": ...}` with 400 for malformed input and 500 for
//! provider or processing failures. Each chat response carries an
//! `x-emotion-context` header (`absent`, `applied` or `degraded`).
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use attune::prelude::*;
//! use attune_web::{WebConfig, spawn_web};
//!
//! let client = OpenRouterClient::new(ProviderConfig::from_env()?)?;
//! let relay = Relay::new(Arc::new(client));
//! let addr = spawn_web(relay, WebConfig::default()).await?;
//! println!("Relay: http://{addr}");
//! ```

mod api;
mod server;

pub use api::{ApiError, EMOTION_CONTEXT_HEADER};
pub use server::{build_router, cors_layer};

use std::net::SocketAddr;

use attune::relay::Relay;

/// Configuration for the web server.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:3001`.
    pub bind_addr: SocketAddr,
    /// Origins allowed to call the API from a browser. `"*"` allows any.
    /// Default: the local frontend dev servers.
    pub allowed_origins: Vec<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
        }
    }
}

/// Spawn the web server on a Tokio task and return the bound address.
///
/// The server runs until the Tokio runtime shuts down.
pub async fn spawn_web(relay: Relay, config: WebConfig) -> Result<SocketAddr, String> {
    let router = server::build_router(relay, &config.allowed_origins);
    server::start_server(router, config.bind_addr).await
}
