//! Per-frame emotion annotation
//!
//! For every frame: ask the detector for faces, keep the first face only,
//! take its highest-scoring emotion, turn it into display text and draw that
//! text onto the frame. Nothing in here may stop the stream: detector
//! failures count as "no face", and frames that cannot be drawn into are
//! passed through untouched.

use crate::detector::EmotionDetector;
use crate::error::MediaError;
use crate::overlay::TextOverlay;
use crate::tracks::VideoFrame;
use moodtrack_core::{EmotionLabel, OverlayText, SessionState};
use tracing::{debug, warn};

/// What happened to one frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Text was drawn onto the frame
    Annotated {
        /// The text that was drawn
        text: OverlayText,
        /// Detector failure that was treated as no face
        detection_error: Option<MediaError>,
    },
    /// The frame was returned unmodified
    PassedThrough {
        /// Why the frame was skipped
        reason: String,
    },
}

impl FrameOutcome {
    /// Drawn text, if the frame was annotated
    pub fn text(&self) -> Option<&OverlayText> {
        match self {
            FrameOutcome::Annotated { text, .. } => Some(text),
            FrameOutcome::PassedThrough { .. } => None,
        }
    }

    /// Whether text was drawn
    pub fn is_annotated(&self) -> bool {
        matches!(self, FrameOutcome::Annotated { .. })
    }
}

/// Result of the detection step for one frame
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    /// First face's winning emotion
    Detected(EmotionLabel),
    /// No face, or no usable score
    NoFace,
    /// Detector failed; handled like `NoFace`
    Failed(MediaError),
}

impl Analysis {
    /// Detected label, if any
    pub fn label(&self) -> Option<&EmotionLabel> {
        match self {
            Analysis::Detected(label) => Some(label),
            _ => None,
        }
    }
}

/// Detector plus overlay, applied frame by frame
pub struct FrameAnnotator<D> {
    detector: D,
    overlay: TextOverlay,
    current_text: OverlayText,
}

impl<D: EmotionDetector> FrameAnnotator<D> {
    /// Annotator showing the waiting text until the first frame
    pub fn new(detector: D, overlay: TextOverlay) -> Self {
        Self {
            detector,
            overlay,
            current_text: OverlayText::Waiting,
        }
    }

    /// Text drawn on the most recent annotated frame
    pub fn current_text(&self) -> &OverlayText {
        &self.current_text
    }

    /// The wrapped detector
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Detect and select without drawing
    pub fn analyze(&mut self, frame: &VideoFrame) -> Analysis {
        let faces = match self.detector.detect_emotions(frame) {
            Ok(faces) => faces,
            Err(e) => {
                let error = MediaError::DetectionFailed {
                    detector: self.detector.name().to_string(),
                    reason: e.to_string(),
                };
                warn!(
                    sequence = frame.sequence,
                    "treating frame as no face: {}", error
                );
                return Analysis::Failed(error);
            }
        };

        // Only the first face in the detector's emission order counts.
        let Some(face) = faces.into_iter().next() else {
            return Analysis::NoFace;
        };

        match face.emotions.top() {
            Some(top) => Analysis::Detected(EmotionLabel::from(top)),
            None => Analysis::NoFace,
        }
    }

    /// Annotate one frame.
    ///
    /// The stored label in `state` is only replaced when a face is found;
    /// a frame without a face shows the no-face text but leaves the previous
    /// label in place.
    pub fn annotate(
        &mut self,
        frame: VideoFrame,
        state: &mut SessionState,
    ) -> (VideoFrame, FrameOutcome) {
        self.annotate_with(frame, |label| state.record_emotion(label))
    }

    /// Annotate one frame, handing a detected label to `record`.
    ///
    /// `record` runs after detection and before drawing, and only when a face
    /// was found. Shared state can be locked inside it without holding the
    /// lock across the detector call.
    pub fn annotate_with<F>(&mut self, mut frame: VideoFrame, record: F) -> (VideoFrame, FrameOutcome)
    where
        F: FnOnce(EmotionLabel),
    {
        if let Err(e) = frame.validate() {
            warn!(sequence = frame.sequence, "passing frame through: {}", e);
            return (
                frame,
                FrameOutcome::PassedThrough {
                    reason: e.to_string(),
                },
            );
        }

        let (text, detection_error) = match self.analyze(&frame) {
            Analysis::Detected(label) => {
                record(label.clone());
                (OverlayText::Emotion(label), None)
            }
            Analysis::NoFace => (OverlayText::NoFace, None),
            Analysis::Failed(error) => (OverlayText::NoFace, Some(error)),
        };

        let rendered = text.to_string();
        if let Err(e) = self.overlay.draw(&mut frame, &rendered) {
            warn!(sequence = frame.sequence, "overlay failed: {}", e);
            return (
                frame,
                FrameOutcome::PassedThrough {
                    reason: e.to_string(),
                },
            );
        }

        debug!(sequence = frame.sequence, text = %rendered, "frame annotated");
        self.current_text = text.clone();
        (
            frame,
            FrameOutcome::Annotated {
                text,
                detection_error,
            },
        )
    }
}

impl<D> std::fmt::Debug for FrameAnnotator<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameAnnotator")
            .field("overlay", &self.overlay)
            .field("current_text", &self.current_text)
            .finish_non_exhaustive()
    }
}
