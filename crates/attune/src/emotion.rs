//! Facial-emotion observations and the short windows they arrive in.
//!
//! Observations are produced on the client (typically a face-analysis model
//! running in the browser) and sent wholesale with each chat request. The
//! relay only reads them: the label of the latest sample selects the tone
//! guidance, the run of labels drives the trend sentence, and the scores are
//! rendered into a detail block for the model.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Vocabulary ─────────────────────────────────────────────────────

/// The fixed emotion vocabulary that has dedicated tone guidance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Fearful,
    Disgusted,
    Surprised,
    Neutral,
}

impl Emotion {
    /// All variants, in the order the guidance table lists them.
    pub const ALL: [Emotion; 7] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Fearful,
        Emotion::Disgusted,
        Emotion::Surprised,
        Emotion::Neutral,
    ];

    /// Resolve a free-form label to a known emotion.
    ///
    /// Matching ignores case and surrounding whitespace. Anything outside the
    /// vocabulary resolves to [`Emotion::Neutral`], so this is total over all
    /// strings.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "happy" => Emotion::Happy,
            "sad" => Emotion::Sad,
            "angry" => Emotion::Angry,
            "fearful" => Emotion::Fearful,
            "disgusted" => Emotion::Disgusted,
            "surprised" => Emotion::Surprised,
            _ => Emotion::Neutral,
        }
    }

    /// Canonical lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Fearful => "fearful",
            Emotion::Disgusted => "disgusted",
            Emotion::Surprised => "surprised",
            Emotion::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Observations ───────────────────────────────────────────────────

/// One sample of facial-emotion analysis.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmotionObservation {
    /// Most prominent label in this sample, exactly as the client sent it.
    pub dominant_emotion: String,
    /// Confidence in the dominant label, 0-100.
    pub confidence: f64,
    /// Per-label scores in `[0.0, 1.0]`.
    #[serde(default)]
    pub emotion_scores: BTreeMap<String, f64>,
    /// When the sample was taken, if the client reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl EmotionObservation {
    /// Observation with a label and confidence and no per-label scores.
    pub fn new(dominant_emotion: impl Into<String>, confidence: f64) -> Self {
        Self {
            dominant_emotion: dominant_emotion.into(),
            confidence,
            emotion_scores: BTreeMap::new(),
            timestamp: None,
        }
    }

    /// Attach a per-label score.
    pub fn with_score(mut self, label: impl Into<String>, score: f64) -> Self {
        self.emotion_scores.insert(label.into(), score);
        self
    }

    /// The known emotion this sample's label resolves to.
    pub fn emotion(&self) -> Emotion {
        Emotion::from_label(&self.dominant_emotion)
    }
}

// ── Window ─────────────────────────────────────────────────────────

/// Chronological run of recent observations, oldest first.
///
/// Serialized as a bare JSON array so it can be embedded directly in a
/// request body or a marker message.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct EmotionWindow(Vec<EmotionObservation>);

impl EmotionWindow {
    pub fn new(observations: Vec<EmotionObservation>) -> Self {
        Self(observations)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn observations(&self) -> &[EmotionObservation] {
        &self.0
    }

    /// Most recent observation.
    pub fn latest(&self) -> Option<&EmotionObservation> {
        self.0.last()
    }

    /// Distinct dominant labels in first-seen order.
    ///
    /// Labels that differ only in case or surrounding whitespace count once,
    /// spelled as they first appeared.
    pub fn distinct_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for obs in &self.0 {
            let label = obs.dominant_emotion.as_str();
            if !labels
                .iter()
                .any(|seen| seen.trim().eq_ignore_ascii_case(label.trim()))
            {
                labels.push(label);
            }
        }
        labels
    }
}

/// Render the window as the detailed emotion data block sent alongside the
/// composed prompt.
///
/// One line per observation, oldest first. Scores are shown as whole
/// percentages in label order.
pub fn render_emotion_detail(window: &EmotionWindow) -> String {
    let mut out = format!(
        "Detailed emotion data ({} recent observation{}, oldest first):",
        window.len(),
        if window.len() == 1 { "" } else { "s" }
    );
    for (i, obs) in window.observations().iter().enumerate() {
        let _ = write!(
            out,
            "\n{}. {} ({:.0}% confidence)",
            i + 1,
            obs.dominant_emotion,
            obs.confidence
        );
        if let Some(ts) = obs.timestamp {
            let _ = write!(out, " at {}", ts.to_rfc3339());
        }
        if !obs.emotion_scores.is_empty() {
            let scores: Vec<String> = obs
                .emotion_scores
                .iter()
                .map(|(label, score)| format!("{label} {:.0}%", score * 100.0))
                .collect();
            let _ = write!(out, ": {}", scores.join(", "));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_label_is_case_insensitive() {
        assert_eq!(Emotion::from_label("HAPPY"), Emotion::Happy);
        assert_eq!(Emotion::from_label("  Fearful "), Emotion::Fearful);
        assert_eq!(Emotion::from_label("disgusted"), Emotion::Disgusted);
    }

    #[test]
    fn unknown_labels_resolve_to_neutral() {
        assert_eq!(Emotion::from_label("bored"), Emotion::Neutral);
        assert_eq!(Emotion::from_label(""), Emotion::Neutral);
    }

    #[test]
    fn every_variant_round_trips_through_its_label() {
        for emotion in Emotion::ALL {
            assert_eq!(Emotion::from_label(emotion.as_str()), emotion);
        }
    }

    #[test]
    fn observation_deserializes_camel_case() {
        let json = r#"{
            "dominantEmotion": "Happy",
            "confidence": 87.5,
            "emotionScores": {"happy": 0.875, "neutral": 0.1}
        }"#;
        let obs: EmotionObservation = serde_json::from_str(json).unwrap();
        assert_eq!(obs.dominant_emotion, "Happy");
        assert_eq!(obs.emotion(), Emotion::Happy);
        assert_eq!(obs.emotion_scores.len(), 2);
        assert!(obs.timestamp.is_none());
    }

    #[test]
    fn scores_default_to_empty() {
        let obs: EmotionObservation =
            serde_json::from_str(r#"{"dominantEmotion":"sad","confidence":40}"#).unwrap();
        assert!(obs.emotion_scores.is_empty());
    }

    #[test]
    fn window_is_a_bare_array() {
        let window: EmotionWindow = serde_json::from_str(
            r#"[{"dominantEmotion":"sad","confidence":40},{"dominantEmotion":"happy","confidence":90}]"#,
        )
        .unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window.latest().unwrap().dominant_emotion, "happy");
    }

    #[test]
    fn distinct_labels_keep_first_seen_order() {
        let window = EmotionWindow::new(vec![
            EmotionObservation::new("happy", 80.0),
            EmotionObservation::new("happy", 75.0),
            EmotionObservation::new("sad", 60.0),
            EmotionObservation::new("happy", 70.0),
        ]);
        assert_eq!(window.distinct_labels(), vec!["happy", "sad"]);
    }

    #[test]
    fn distinct_labels_fold_case_and_keep_first_spelling() {
        let window = EmotionWindow::new(vec![
            EmotionObservation::new("Happy", 80.0),
            EmotionObservation::new("happy ", 75.0),
            EmotionObservation::new("SAD", 60.0),
            EmotionObservation::new("sad", 55.0),
        ]);
        assert_eq!(window.distinct_labels(), vec!["Happy", "SAD"]);
    }

    #[test]
    fn distinct_labels_keep_unknown_labels_apart() {
        let window = EmotionWindow::new(vec![
            EmotionObservation::new("bored", 50.0),
            EmotionObservation::new("tired", 50.0),
        ]);
        assert_eq!(window.distinct_labels(), vec!["bored", "tired"]);
    }

    #[test]
    fn detail_lists_each_observation_in_order() {
        let window = EmotionWindow::new(vec![
            EmotionObservation::new("neutral", 55.0).with_score("neutral", 0.55),
            EmotionObservation::new("sad", 72.4)
                .with_score("sad", 0.724)
                .with_score("neutral", 0.2),
        ]);
        let detail = render_emotion_detail(&window);
        assert!(detail.starts_with("Detailed emotion data (2 recent observations"));
        assert!(detail.contains("1. neutral (55% confidence): neutral 55%"));
        assert!(detail.contains("2. sad (72% confidence): neutral 20%, sad 72%"));
    }

    #[test]
    fn detail_includes_timestamps_when_present() {
        let mut obs = EmotionObservation::new("happy", 90.0);
        obs.timestamp = Some("2024-05-01T12:00:00Z".parse().unwrap());
        let detail = render_emotion_detail(&EmotionWindow::new(vec![obs]));
        assert!(detail.contains("1 recent observation,"));
        assert!(detail.contains("at 2024-05-01T12:00:00+00:00"));
    }
}
