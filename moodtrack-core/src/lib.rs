//! # moodtrack core
//!
//! Domain types shared by the live mood tracker: the emotion observations
//! produced by a detector, the display labels drawn on video frames, and the
//! per-session state toggled by the start/stop camera actions.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod emotion;
pub mod error;
pub mod label;
pub mod session;

// Re-export main types
pub use emotion::{BoundingBox, EmotionCategory, EmotionObservation, EmotionScore, FaceRecord};
pub use error::{MoodTrackError, MoodTrackResult};
pub use label::{
    capitalize, glyph_for, EmotionLabel, OverlayText, DEFAULT_GLYPH, NEUTRAL_GLYPH, NO_FACE_TEXT,
    WAITING_TEXT,
};
pub use session::{CameraState, SessionState};
