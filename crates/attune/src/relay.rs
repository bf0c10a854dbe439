//! The request pipeline: inbound conversation in, model reply out.
//!
//! [`Relay::handle`] runs one request end to end:
//!
//! ```text
//! ChatInput ─▶ extract ─▶ compose ─▶ render detail ─▶ assemble ─▶ ChatProvider ─▶ RelayReply
//! ```
//!
//! The relay holds no mutable state and is shared across requests behind an
//! `Arc`. Each request makes at most one provider call and is never retried.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::assemble::assemble;
use crate::client::ChatProvider;
use crate::emotion::{EmotionWindow, render_emotion_detail};
use crate::extract::{self, EmotionContext};
use crate::prompt::compose;
use crate::{Message, RelayError};

/// A validated inbound chat request.
#[derive(Debug, Clone)]
pub struct ChatInput {
    pub messages: Vec<Message>,
    pub emotions: Option<EmotionWindow>,
    emotions_error: Option<String>,
}

impl ChatInput {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            emotions: None,
            emotions_error: None,
        }
    }

    /// Attach an explicit emotion window (the structured side channel).
    pub fn with_emotions(mut self, window: EmotionWindow) -> Self {
        self.emotions = Some(window);
        self
    }

    /// Validate a JSON request body of the form
    /// `{"messages": [...], "emotions": [...]?}`.
    ///
    /// Anything wrong with `messages` is [`RelayError::MalformedInput`]. A bad
    /// `emotions` field is not an error: the request proceeds with a degraded
    /// emotion context.
    pub fn from_json(mut body: serde_json::Value) -> Result<Self, RelayError> {
        let obj = body
            .as_object_mut()
            .ok_or_else(|| RelayError::MalformedInput("request body must be a JSON object".into()))?;

        let messages = match obj.remove("messages") {
            Some(value @ serde_json::Value::Array(_)) => {
                serde_json::from_value::<Vec<Message>>(value).map_err(|e| {
                    RelayError::MalformedInput(format!("invalid message in `messages`: {e}"))
                })?
            }
            Some(_) => {
                return Err(RelayError::MalformedInput(
                    "`messages` must be an array".into(),
                ));
            }
            None => return Err(RelayError::MalformedInput("missing `messages`".into())),
        };

        let mut input = Self::new(messages);
        match obj.remove("emotions") {
            None | Some(serde_json::Value::Null) => {}
            Some(value) => match serde_json::from_value::<EmotionWindow>(value) {
                Ok(window) => input.emotions = Some(window),
                Err(e) => input.emotions_error = Some(format!("invalid `emotions` field: {e}")),
            },
        }
        Ok(input)
    }

    /// Resolve where this request's emotion data comes from.
    pub fn emotion_context(&self) -> EmotionContext {
        if let Some(reason) = &self.emotions_error {
            warn!("Ignoring malformed emotion data: {reason}");
            return EmotionContext::Degraded {
                reason: reason.clone(),
            };
        }
        extract::from_request(&self.messages, self.emotions.as_ref())
    }
}

/// Build the exact message list that would be sent to the provider.
pub fn prepare(input: &ChatInput) -> (Vec<Message>, EmotionContext) {
    let context = input.emotion_context();
    let window = context.window();
    let prompt = compose(window);
    let detail = window.map(render_emotion_detail);
    let conversation = assemble(prompt, detail, &input.messages);
    (conversation, context)
}

/// Result of a successful relay.
#[derive(Debug, Clone)]
pub struct RelayReply {
    /// The model's reply text.
    pub message: String,
    /// How emotion data was handled for this request.
    pub emotion_context: EmotionContext,
}

/// Emotion-aware chat relay.
#[derive(Clone)]
pub struct Relay {
    provider: Arc<dyn ChatProvider>,
}

impl Relay {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self { provider }
    }

    /// Model identifier of the underlying provider.
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Relay one request to the provider.
    pub async fn handle(&self, input: ChatInput) -> Result<RelayReply, RelayError> {
        let (conversation, emotion_context) = prepare(&input);
        debug!(
            "Relaying {} messages (emotion context: {})",
            conversation.len(),
            emotion_context.kind()
        );

        let message = self.provider.complete(conversation).await.map_err(|e| {
            error!("Provider call failed: {e}");
            RelayError::Provider(e)
        })?;

        Ok(RelayReply {
            message,
            emotion_context,
        })
    }
}
