//! Convenience re-exports for common `attune` types.
//!
//! ```ignore
//! use attune::prelude::*;
//! ```

pub use crate::{Message, MessageRole, RelayError};

pub use crate::client::{ChatFuture, ChatProvider, FALLBACK_REPLY, OpenRouterClient};
pub use crate::config::ProviderConfig;
pub use crate::emotion::{Emotion, EmotionObservation, EmotionWindow, render_emotion_detail};
pub use crate::extract::{EMOTION_MARKER, EmotionContext};
pub use crate::prompt::{BASE_INSTRUCTION, compose, guidance_for};
pub use crate::relay::{ChatInput, Relay, RelayReply};
