//! Locating emotion data in an inbound chat request.
//!
//! Clients can send emotion observations two ways:
//!
//! 1. As an explicit `emotions` array on the request body. This is the
//!    preferred channel and always wins when it carries data.
//! 2. Embedded in a `system` message whose content contains
//!    [`EMOTION_MARKER`] followed by a JSON array, the convention older
//!    clients use.
//!
//! Extraction never fails the request. Unparseable data is reported as
//! [`EmotionContext::Degraded`] and the relay carries on without emotion
//! context.

use tracing::{debug, warn};

use crate::emotion::EmotionWindow;
use crate::{Message, MessageRole};

/// Phrase that introduces an embedded emotion array in a system message.
pub const EMOTION_MARKER: &str = "Recent emotion data:";

/// Outcome of looking for emotion data on a request.
#[derive(Debug, Clone, PartialEq)]
pub enum EmotionContext {
    /// No emotion data was supplied.
    Absent,
    /// A non-empty window was found.
    Applied(EmotionWindow),
    /// Emotion data was supplied but could not be used.
    Degraded { reason: String },
}

impl EmotionContext {
    /// The usable window, if any.
    pub fn window(&self) -> Option<&EmotionWindow> {
        match self {
            EmotionContext::Applied(w) => Some(w),
            _ => None,
        }
    }

    /// Short lowercase name, used in the `x-emotion-context` header and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            EmotionContext::Absent => "absent",
            EmotionContext::Applied(_) => "applied",
            EmotionContext::Degraded { .. } => "degraded",
        }
    }

    fn from_window(window: EmotionWindow) -> Self {
        if window.is_empty() {
            EmotionContext::Absent
        } else {
            EmotionContext::Applied(window)
        }
    }
}

/// Resolve the emotion context for a request.
///
/// `structured` is the request's explicit `emotions` field. When it is absent
/// or empty, the messages are scanned for the marker convention.
pub fn from_request(messages: &[Message], structured: Option<&EmotionWindow>) -> EmotionContext {
    if let Some(window) = structured.filter(|w| !w.is_empty()) {
        debug!("Emotion data from request field: {} observations", window.len());
        return EmotionContext::Applied(window.clone());
    }

    let context = from_messages(messages);
    match &context {
        EmotionContext::Applied(w) => {
            debug!("Emotion data from marker message: {} observations", w.len())
        }
        EmotionContext::Degraded { reason } => {
            warn!("Ignoring malformed emotion data: {reason}")
        }
        EmotionContext::Absent => debug!("No emotion data on request"),
    }
    context
}

/// Scan for the first system message carrying [`EMOTION_MARKER`] and parse the
/// array that follows it.
pub fn from_messages(messages: &[Message]) -> EmotionContext {
    let embedded = messages
        .iter()
        .filter(|m| m.role == MessageRole::System)
        .find_map(|m| {
            m.content
                .split_once(EMOTION_MARKER)
                .map(|(_, rest)| rest)
        });

    match embedded {
        None => EmotionContext::Absent,
        Some(rest) => match parse_embedded_window(rest) {
            Ok(window) => EmotionContext::from_window(window),
            Err(reason) => EmotionContext::Degraded { reason },
        },
    }
}

/// Parse the first JSON array in `text`, ignoring anything after it.
fn parse_embedded_window(text: &str) -> Result<EmotionWindow, String> {
    let array = text
        .find('[')
        .and_then(|start| text.get(start..))
        .ok_or_else(|| "no JSON array after emotion marker".to_string())?;
    let mut stream = serde_json::Deserializer::from_str(array).into_iter::<EmotionWindow>();
    match stream.next() {
        Some(Ok(window)) => Ok(window),
        Some(Err(e)) => Err(format!("invalid emotion JSON: {e}")),
        None => Err("empty emotion payload".to_string()),
    }
}
