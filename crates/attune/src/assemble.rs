//! Final conversation assembly for the provider call.

use crate::{Message, MessageRole};

/// Build the message list sent to the model provider.
///
/// The composed prompt comes first, followed by the detailed emotion data
/// block when there is one. Caller messages follow in their original order;
/// caller `system` messages are dropped because the two synthesized ones
/// replace them.
pub fn assemble(prompt: String, detail: Option<String>, messages: &[Message]) -> Vec<Message> {
    let mut out = Vec::with_capacity(messages.len() + 2);
    out.push(Message::system(prompt));
    if let Some(detail) = detail.filter(|d| !d.is_empty()) {
        out.push(Message::system(detail));
    }
    out.extend(
        messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .cloned(),
    );
    out
}
