//! Provider configuration.
//!
//! [`ProviderConfig`] carries everything the provider client needs:
//! credentials, endpoint, the fixed model and sampling parameters, and the
//! request timeout. It is built once at startup and handed to
//! [`OpenRouterClient::new`](crate::client::OpenRouterClient::new).

use std::time::Duration;

use crate::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, OPENROUTER_URL};

/// Configuration for the chat-completion provider.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Bearer token sent in the `Authorization` header.
    pub api_key: String,
    /// Chat-completions URL. Default: [`OPENROUTER_URL`].
    pub endpoint: String,
    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,
    /// Maximum tokens per reply. Default: [`DEFAULT_MAX_TOKENS`].
    pub max_tokens: u32,
    /// Sampling temperature. Default: [`DEFAULT_TEMPERATURE`].
    pub temperature: f32,
    /// Whole-request timeout for the provider call. Default: 60 s.
    pub timeout: Duration,
    /// `HTTP-Referer` attribution header.
    pub referer: String,
    /// `X-Title` attribution header.
    pub title: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: OPENROUTER_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(60),
            referer: "https://github.com/attune-rs/attune".to_string(),
            title: "attune".to_string(),
        }
    }
}

impl ProviderConfig {
    /// Default configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Read the API key from the `OPENROUTER_KEY` environment variable.
    pub fn from_env() -> Result<Self, String> {
        let api_key =
            std::env::var("OPENROUTER_KEY").map_err(|_| "OPENROUTER_KEY not set".to_string())?;
        Ok(Self::new(api_key))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// The API key never appears in logs.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .field("referer", &self.referer)
            .field("title", &self.title)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_fixed_sampling() {
        let config = ProviderConfig::new("sk-test");
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.endpoint, OPENROUTER_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert!((config.temperature - DEFAULT_TEMPERATURE).abs() < f32::EPSILON);
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn builders_override_fields() {
        let config = ProviderConfig::new("k")
            .with_model("openai/gpt-4o")
            .with_max_tokens(200)
            .with_temperature(0.2)
            .with_timeout(Duration::from_secs(5))
            .with_endpoint("http://127.0.0.1:9/v1/chat/completions");
        assert_eq!(config.model, "openai/gpt-4o");
        assert_eq!(config.max_tokens, 200);
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.endpoint.starts_with("http://127.0.0.1:9"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let rendered = format!("{:?}", ProviderConfig::new("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
