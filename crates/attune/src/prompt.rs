//! Emotion-aware system prompt composition.
//!
//! [`compose`] turns a window of recent emotion observations into the system
//! instruction that steers the model's tone. Without emotion data the result
//! is exactly [`BASE_INSTRUCTION`]; with data it appends a trend sentence, the
//! guidance block for the latest emotion, and a closing directive.
//!
//! ```
//! use attune::emotion::{EmotionObservation, EmotionWindow};
//! use attune::prompt::{BASE_INSTRUCTION, compose};
//!
//! assert_eq!(compose(None), BASE_INSTRUCTION);
//!
//! let window = EmotionWindow::new(vec![EmotionObservation::new("sad", 81.0)]);
//! let prompt = compose(Some(&window));
//! assert!(prompt.contains("consistently displaying sad emotions"));
//! ```

use crate::emotion::{Emotion, EmotionWindow};

/// Persona and standing constraints shared by every request.
pub const BASE_INSTRUCTION: &str = "\
You are Attune, a warm and emotionally intelligent conversational companion. \
Keep replies concise (a few sentences unless the user asks for more), \
empathetic and natural. Speak like a thoughtful friend, not a clinician: \
avoid diagnostic language, jargon and lists of coping techniques unless asked. \
You are not a therapist or a substitute for professional mental health care; \
if the user describes a crisis or risk of harm, gently encourage them to reach \
out to a qualified professional or local emergency services.";

/// Last section of every emotion-aware prompt.
pub const CLOSING_DIRECTIVE: &str = "\
Use the detailed emotion data that accompanies this conversation to inform \
your tone and responses. Do not mention facial expression analysis, emotion \
detection or the camera unless the user brings it up first.";

const HAPPY_GUIDANCE: &str = "\
- Match their positive energy with warmth and enthusiasm.
- Celebrate what is going well and invite them to share more.
- Keep the tone light and playful where it fits.";

const SAD_GUIDANCE: &str = "\
- Slow down and respond gently; acknowledge how they feel before anything else.
- Offer comfort and validation rather than quick fixes.
- Ask soft, open questions and let them set the pace.";

const ANGRY_GUIDANCE: &str = "\
- Stay calm and steady; do not match or escalate their intensity.
- Acknowledge their frustration as understandable without judging it.
- Keep sentences short and focus on what would help them right now.";

const FEARFUL_GUIDANCE: &str = "\
- Be reassuring and grounding; speak with calm confidence.
- Break things into small, manageable steps.
- Remind them they are not alone in this conversation.";

const DISGUSTED_GUIDANCE: &str = "\
- Acknowledge their reaction without amplifying it.
- Stay neutral and respectful; avoid graphic or dismissive language.
- Help them put words to what is bothering them.";

const SURPRISED_GUIDANCE: &str = "\
- Engage with their curiosity or shock and help them make sense of it.
- Offer clear, simple context.
- Check whether the surprise feels good or unsettling before going further.";

const NEUTRAL_GUIDANCE: &str = "\
- Keep a friendly, balanced and attentive tone.
- Follow their lead on topic and depth.
- Gently invite them to share more about how they are doing.";

/// The tone guidance registered for an emotion.
pub fn guidance_for(emotion: Emotion) -> &'static str {
    match emotion {
        Emotion::Happy => HAPPY_GUIDANCE,
        Emotion::Sad => SAD_GUIDANCE,
        Emotion::Angry => ANGRY_GUIDANCE,
        Emotion::Fearful => FEARFUL_GUIDANCE,
        Emotion::Disgusted => DISGUSTED_GUIDANCE,
        Emotion::Surprised => SURPRISED_GUIDANCE,
        Emotion::Neutral => NEUTRAL_GUIDANCE,
    }
}

/// Build the system instruction for a request.
///
/// An absent or empty window yields [`BASE_INSTRUCTION`] unchanged. Labels
/// select guidance case-insensitively but appear verbatim in the trend
/// sentence.
pub fn compose(window: Option<&EmotionWindow>) -> String {
    let Some((window, latest)) = window.and_then(|w| w.latest().map(|l| (w, l))) else {
        return BASE_INSTRUCTION.to_string();
    };

    let labels = window.distinct_labels();
    let trend = if labels.len() == 1 {
        format!(
            "The user has been consistently displaying {} emotions.",
            latest.dominant_emotion
        )
    } else {
        format!(
            "The user's emotions have been shifting between {}. \
             Their current dominant emotion is {}.",
            labels.join(", "),
            latest.dominant_emotion
        )
    };

    SystemPromptBuilder::new(BASE_INSTRUCTION)
        .raw(trend)
        .section("How to respond right now", guidance_for(latest.emotion()))
        .raw(CLOSING_DIRECTIVE)
        .build()
}

// ── Builder ────────────────────────────────────────────────────────

/// Builder for multi-section system prompts.
///
/// Sections are joined with double newlines. Empty sections are silently
/// skipped.
///
/// ```
/// use attune::prompt::SystemPromptBuilder;
///
/// let prompt = SystemPromptBuilder::new("You are a helpful agent.")
///     .section("Context", "Today is Monday.")
///     .raw("Be brief.")
///     .build();
///
/// assert_eq!(prompt, "You are a helpful agent.\n\n## Context\n\nToday is Monday.\n\nBe brief.");
/// ```
pub struct SystemPromptBuilder {
    sections: Vec<String>,
}

impl SystemPromptBuilder {
    /// Create a new builder with an initial preamble included as-is.
    pub fn new(preamble: impl Into<String>) -> Self {
        Self {
            sections: vec![preamble.into()],
        }
    }

    /// Append a named section under a `##` heading.
    ///
    /// Skipped if `content` is empty.
    pub fn section(mut self, heading: &str, content: impl Into<String>) -> Self {
        let content = content.into();
        if !content.is_empty() {
            self.sections.push(format!("## {heading}\n\n{content}"));
        }
        self
    }

    /// Append raw text without a heading.
    ///
    /// Skipped if `content` is empty.
    pub fn raw(mut self, content: impl Into<String>) -> Self {
        let content = content.into();
        if !content.is_empty() {
            self.sections.push(content);
        }
        self
    }

    /// Join all sections with double newlines.
    pub fn build(self) -> String {
        self.sections.join("\n\n")
    }
}
