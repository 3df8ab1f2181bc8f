//! Face-emotion detector seam
//!
//! The actual face detection and emotion classification live outside this
//! crate. A detector takes one decoded frame and reports the faces it found,
//! in its own emission order; it must not depend on earlier frames.

use crate::tracks::VideoFrame;
use moodtrack_core::FaceRecord;
use std::collections::VecDeque;
use thiserror::Error;

/// Failure reported by a detector for a single frame
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    /// The model itself failed
    #[error("Model error: {reason}")]
    Model {
        /// Failure reason
        reason: String,
    },
}

/// External face-emotion detection capability
pub trait EmotionDetector: Send {
    /// Analyze one frame. An empty result means no face was found.
    fn detect_emotions(&mut self, frame: &VideoFrame) -> Result<Vec<FaceRecord>, DetectionError>;

    /// Detector name used in logs
    fn name(&self) -> &str {
        "detector"
    }
}

impl<D: EmotionDetector + ?Sized> EmotionDetector for Box<D> {
    fn detect_emotions(&mut self, frame: &VideoFrame) -> Result<Vec<FaceRecord>, DetectionError> {
        (**self).detect_emotions(frame)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Result type a [`ScriptedDetector`] replays
pub type DetectionResult = Result<Vec<FaceRecord>, DetectionError>;

/// Detector that replays a fixed script of results, one per frame
///
/// Stands in for a real model in demos and tests. Once the script is
/// exhausted it either starts over (`cycle`) or reports no faces.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDetector {
    script: VecDeque<DetectionResult>,
    cycle: bool,
    calls: u64,
}

impl ScriptedDetector {
    /// Replay `script` once, then report no faces
    pub fn new(script: impl IntoIterator<Item = DetectionResult>) -> Self {
        Self {
            script: script.into_iter().collect(),
            cycle: false,
            calls: 0,
        }
    }

    /// Replay `script` forever
    pub fn cycling(script: impl IntoIterator<Item = DetectionResult>) -> Self {
        Self {
            cycle: true,
            ..Self::new(script)
        }
    }

    /// Number of frames analyzed so far
    pub fn calls(&self) -> u64 {
        self.calls
    }
}

impl EmotionDetector for ScriptedDetector {
    fn detect_emotions(&mut self, _frame: &VideoFrame) -> DetectionResult {
        self.calls += 1;
        match self.script.pop_front() {
            Some(result) => {
                if self.cycle {
                    self.script.push_back(result.clone());
                }
                result
            }
            None => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
