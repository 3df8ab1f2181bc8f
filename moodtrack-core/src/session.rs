//! Per-session state toggled by the start/stop camera actions

use crate::label::EmotionLabel;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Camera state machine: two states, both transitions always legal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraState {
    /// No video pipeline mounted
    Off,
    /// Video pipeline should be mounted
    On,
}

impl CameraState {
    /// Transition for the "start camera" action
    pub fn start(self) -> Self {
        CameraState::On
    }

    /// Transition for the "stop camera" action
    pub fn stop(self) -> Self {
        CameraState::Off
    }

    /// Whether the camera is on
    pub fn is_on(self) -> bool {
        self == CameraState::On
    }
}

impl Default for CameraState {
    fn default() -> Self {
        CameraState::Off
    }
}

/// Mutable record owned by exactly one interactive session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    camera: CameraState,
    last_emotion: Option<EmotionLabel>,
}

impl SessionState {
    /// Fresh state: camera off, no emotion recorded
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn the camera on. Idempotent.
    pub fn start(&mut self) {
        self.camera = self.camera.start();
        debug!("camera state -> on");
    }

    /// Turn the camera off. Idempotent.
    pub fn stop(&mut self) {
        self.camera = self.camera.stop();
        debug!("camera state -> off");
    }

    /// Current camera state
    pub fn camera(&self) -> CameraState {
        self.camera
    }

    /// Whether the camera flag is set
    pub fn is_camera_on(&self) -> bool {
        self.camera.is_on()
    }

    /// Read used by the render step to decide whether to mount the pipeline
    pub fn should_mount_pipeline(&self) -> bool {
        self.is_camera_on()
    }

    /// Remember the most recent detected emotion
    pub fn record_emotion(&mut self, label: EmotionLabel) {
        self.last_emotion = Some(label);
    }

    /// Most recent detected emotion
    pub fn last_emotion(&self) -> Option<&EmotionLabel> {
        self.last_emotion.as_ref()
    }

    /// Most recent detected emotion as display text
    pub fn last_emotion_label(&self) -> Option<String> {
        self.last_emotion.as_ref().map(ToString::to_string)
    }
}
