//! Chat-completion provider client.
//!
//! [`ChatProvider`] is the seam between the relay and the language model. The
//! production implementation is [`OpenRouterClient`], which talks to any
//! OpenAI-compatible chat-completions endpoint (OpenRouter by default). Tests
//! substitute their own implementations to count or script calls.

use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use serde::Deserialize;
use tracing::{debug, trace};

use crate::config::ProviderConfig;
use crate::{ChatRequest, Message};

/// Reply used when the provider returns a completion without any text.
pub const FALLBACK_REPLY: &str = "I'm sorry, I couldn't come up with a response just now.";

/// Type alias to keep trait signatures and implementations readable.
pub type ChatFuture<'a> = Pin<Box<dyn Future<Output = Result<String, String>> + Send + 'a>>;

/// A chat-completion backend.
///
/// Uses a boxed future so that the trait is dyn-compatible and the relay can
/// hold an `Arc<dyn ChatProvider>`.
pub trait ChatProvider: Send + Sync {
    /// Send one conversation and return the reply text.
    ///
    /// At most one outbound call is made. Errors are human-readable strings
    /// for logging; they are never shown to end users verbatim.
    fn complete(&self, messages: Vec<Message>) -> ChatFuture<'_>;

    /// Model identifier, for diagnostics.
    fn model(&self) -> &str;
}

// ── Response types ─────────────────────────────────────────────────

/// Raw API response (internal deserialization target).
#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Token usage statistics.
#[derive(Deserialize, Debug, Clone)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// First choice of a chat completion.
#[derive(Debug)]
pub struct ChatCompletion {
    pub content: Option<String>,
    pub finish_reason: Option<String>,
    pub usage: Option<UsageInfo>,
}

impl ChatCompletion {
    /// Reply text, or [`FALLBACK_REPLY`] when the model produced none.
    pub fn text_or_fallback(self) -> String {
        match self.content {
            Some(text) if !text.trim().is_empty() => text,
            _ => FALLBACK_REPLY.to_string(),
        }
    }
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for an OpenAI-compatible chat completions API.
pub struct OpenRouterClient {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl OpenRouterClient {
    /// Build a client from an explicit configuration.
    pub fn new(config: ProviderConfig) -> Result<Self, String> {
        if config.api_key.trim().is_empty() {
            return Err("provider API key is empty".to_string());
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("attune/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self { client, config })
    }

    /// Request body for a conversation, using the configured model and
    /// sampling parameters.
    pub fn request_for(&self, messages: Vec<Message>) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    /// Send a chat completion request.
    ///
    /// A response without any choices is an error; a choice without text is
    /// not (see [`ChatCompletion::text_or_fallback`]).
    pub async fn chat(&self, body: &ChatRequest) -> Result<ChatCompletion, String> {
        debug!(
            "LLM request: model={}, messages={}, max_tokens={}, temp={}",
            body.model,
            body.messages.len(),
            body.max_tokens,
            body.temperature,
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();

        let resp = self
            .client
            .post(&self.config.endpoint)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| format!("failed to read response: {e}"))?;

        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(format!("provider API HTTP {status}: {text}"));
        }

        let parsed: RawChatResponse =
            serde_json::from_str(&text).map_err(|e| format!("failed to parse response: {e}"))?;

        if let Some(err) = parsed.error {
            return Err(format!("provider API error: {}", err.message));
        }

        if let Some(ref usage) = parsed.usage {
            debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens.unwrap_or(0),
                usage.completion_tokens.unwrap_or(0),
                usage.total_tokens.unwrap_or(0),
            );
        }

        let choice = parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| "provider returned no completion".to_string())?;

        debug!(
            "LLM output: {} chars, finish_reason={}",
            choice.message.content.as_ref().map_or(0, |s| s.len()),
            choice.finish_reason.as_deref().unwrap_or("none"),
        );

        Ok(ChatCompletion {
            content: choice.message.content,
            finish_reason: choice.finish_reason,
            usage: parsed.usage,
        })
    }
}

impl ChatProvider for OpenRouterClient {
    fn complete(&self, messages: Vec<Message>) -> ChatFuture<'_> {
        Box::pin(async move {
            let body = self.request_for(messages);
            let completion = self.chat(&body).await?;
            Ok(completion.text_or_fallback())
        })
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
