//! Display text drawn on annotated frames

use crate::emotion::{EmotionCategory, EmotionScore};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Glyph for the neutral category, also used by the no-face text
pub const NEUTRAL_GLYPH: &str = "😐";

/// Glyph for emotion names outside the known categories
pub const DEFAULT_GLYPH: &str = "🙂";

/// Overlay text when the detector reports no face
pub const NO_FACE_TEXT: &str = "😐 No face detected";

/// Overlay text before the first frame has been analyzed
pub const WAITING_TEXT: &str = "Waiting for face...";

/// Glyph for an emotion name, case-insensitive
pub fn glyph_for(name: &str) -> &'static str {
    EmotionCategory::from_name(name)
        .map(|category| category.glyph())
        .unwrap_or(DEFAULT_GLYPH)
}

/// Upper-case the first character and lower-case the rest
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Winning emotion of one frame, ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionLabel {
    /// Emotion name as reported by the detector
    pub name: String,
    /// Confidence score of the winning entry
    pub score: f32,
}

impl EmotionLabel {
    /// Create a label from a name and score
    pub fn new(name: impl Into<String>, score: f32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }

    /// Known category, if the name maps to one
    pub fn category(&self) -> Option<EmotionCategory> {
        EmotionCategory::from_name(&self.name)
    }

    /// Emoji glyph for the label
    pub fn glyph(&self) -> &'static str {
        glyph_for(&self.name)
    }

    /// Score as a percentage
    pub fn percent(&self) -> f64 {
        f64::from(self.score) * 100.0
    }
}

impl From<EmotionScore<'_>> for EmotionLabel {
    fn from(entry: EmotionScore<'_>) -> Self {
        Self::new(entry.name, entry.score)
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({:.1}%)",
            self.glyph(),
            capitalize(&self.name),
            self.percent()
        )
    }
}

/// Text shown on a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlayText {
    /// Nothing analyzed yet
    Waiting,
    /// The detector found no face, or failed
    NoFace,
    /// A face was found
    Emotion(EmotionLabel),
}

impl OverlayText {
    /// Detected label, if any
    pub fn label(&self) -> Option<&EmotionLabel> {
        match self {
            OverlayText::Emotion(label) => Some(label),
            _ => None,
        }
    }
}

impl Default for OverlayText {
    fn default() -> Self {
        OverlayText::Waiting
    }
}

impl fmt::Display for OverlayText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayText::Waiting => f.write_str(WAITING_TEXT),
            OverlayText::NoFace => f.write_str(NO_FACE_TEXT),
            OverlayText::Emotion(label) => fmt::Display::fmt(label, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_label_text() {
        let label = EmotionLabel::new("happy", 0.82);
        assert_eq!(label.to_string(), "😄 Happy (82.0%)");
    }

    #[test]
    fn test_surprise_label_text() {
        let label = EmotionLabel::new("surprise", 0.455);
        assert_eq!(label.to_string(), "😲 Surprise (45.5%)");
    }

    #[test]
    fn test_every_category_has_its_glyph() {
        let expected = [
            ("angry", "😠"),
            ("disgust", "🤢"),
            ("fear", "😨"),
            ("happy", "😄"),
            ("sad", "😢"),
            ("surprise", "😲"),
            ("neutral", "😐"),
        ];
        for (name, glyph) in expected {
            assert_eq!(glyph_for(name), glyph, "glyph for {}", name);
            assert_eq!(glyph_for(&name.to_uppercase()), glyph);
        }
    }

    #[test]
    fn test_unknown_category_uses_default_glyph() {
        let label = EmotionLabel::new("contempt", 0.5);
        assert_eq!(label.glyph(), DEFAULT_GLYPH);
        assert_eq!(label.to_string(), "🙂 Contempt (50.0%)");
    }

    #[test]
    fn test_capitalize_lowercases_the_rest() {
        assert_eq!(capitalize("HAPPY"), "Happy");
        assert_eq!(capitalize("sUrPrIsE"), "Surprise");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_percentage_rounds_to_one_decimal() {
        assert_eq!(EmotionLabel::new("sad", 0.0).to_string(), "😢 Sad (0.0%)");
        assert_eq!(EmotionLabel::new("sad", 1.0).to_string(), "😢 Sad (100.0%)");
        assert_eq!(EmotionLabel::new("fear", 0.123).to_string(), "😨 Fear (12.3%)");
        assert_eq!(EmotionLabel::new("fear", 0.9999).to_string(), "😨 Fear (100.0%)");
    }

    #[test]
    fn test_overlay_text_display() {
        assert_eq!(OverlayText::NoFace.to_string(), "😐 No face detected");
        assert_eq!(OverlayText::default().to_string(), WAITING_TEXT);
        assert!(NO_FACE_TEXT.starts_with(NEUTRAL_GLYPH));

        let text = OverlayText::Emotion(EmotionLabel::new("angry", 0.61));
        assert_eq!(text.to_string(), "😠 Angry (61.0%)");
        assert_eq!(text.label().map(|label| label.name.as_str()), Some("angry"));
    }
}
