//! Emotion-aware system prompts and a chat-completion relay.
//!
//! `attune` sits between a chat client and an OpenAI-compatible
//! chat-completions API (OpenRouter by default). Clients send a conversation
//! together with a short window of facial-emotion readings; attune turns the
//! readings into a system instruction that adjusts the model's tone, forwards
//! the augmented conversation, and returns the reply.
//!
//! # Getting started
//!
//! ```ignore
//! use std::sync::Arc;
//! use attune::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), String> {
//!     let client = OpenRouterClient::new(ProviderConfig::from_env()?)?;
//!     let relay = Relay::new(Arc::new(client));
//!
//!     let window = EmotionWindow::new(vec![EmotionObservation::new("sad", 72.0)]);
//!     let input = ChatInput::new(vec![Message::user("Long week.")]).with_emotions(window);
//!
//!     let reply = relay.handle(input).await.map_err(|e| e.to_string())?;
//!     println!("{}", reply.message);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`emotion`] | [`EmotionObservation`](emotion::EmotionObservation), [`EmotionWindow`](emotion::EmotionWindow), the [`Emotion`](emotion::Emotion) vocabulary |
//! | [`prompt`] | [`compose`](prompt::compose) and the per-emotion guidance table |
//! | [`extract`] | Finding emotion data on a request, [`EmotionContext`](extract::EmotionContext) |
//! | [`assemble`] | Final provider conversation |
//! | [`client`] | [`ChatProvider`](client::ChatProvider) seam and [`OpenRouterClient`](client::OpenRouterClient) |
//! | [`config`] | [`ProviderConfig`](config::ProviderConfig) |
//! | [`relay`] | [`Relay`](relay::Relay) request pipeline |

pub mod assemble;
pub mod client;
pub mod config;
pub mod emotion;
pub mod extract;
pub mod prelude;
pub mod prompt;
pub mod relay;

use serde::{Deserialize, Serialize};

// ── Constants ──────────────────────────────────────────────────────

pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model for relayed conversations.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Replies are kept short; the persona asks for a few sentences.
pub const DEFAULT_MAX_TOKENS: u32 = 500;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

// ── Errors ─────────────────────────────────────────────────────────

/// Failures that end a relay request.
///
/// Malformed emotion data is deliberately absent: it degrades the emotion
/// context instead of failing the request.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The caller's request was unusable. No provider call was made.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The provider call failed, timed out, or returned no completion.
    #[error("provider failure: {0}")]
    Provider(String),
}

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in the conversation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

// ── Request types ──────────────────────────────────────────────────

/// Chat completion request body.
#[derive(Serialize, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors() {
        let sys = Message::system("hello");
        assert_eq!(sys.role, MessageRole::System);
        assert_eq!(sys.content, "hello");

        assert_eq!(Message::user("world").role, MessageRole::User);
        assert_eq!(Message::assistant("ok").role, MessageRole::Assistant);
    }

    #[test]
    fn message_wire_format() {
        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));

        let parsed: Message =
            serde_json::from_str(r#"{"role":"assistant","content":"yo"}"#).unwrap();
        assert_eq!(parsed, Message::assistant("yo"));
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(serde_json::from_str::<Message>(r#"{"role":"tool","content":"x"}"#).is_err());
    }

    #[test]
    fn chat_request_serializes_fixed_parameters() {
        let req = ChatRequest {
            model: "test-model".into(),
            messages: vec![Message::user("hi")],
            max_tokens: 100,
            temperature: 0.5,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "test-model");
        assert_eq!(json["max_tokens"], 100);
        assert_eq!(json["temperature"], 0.5);
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn relay_error_messages() {
        let err = RelayError::MalformedInput("`messages` must be an array".into());
        assert_eq!(err.to_string(), "malformed input: `messages` must be an array");
    }
}
