//! # moodtrack media
//!
//! Video frame handling for the live mood tracker: pixel formats and capture
//! constraints, the bitmap text overlay, the detector seam, the per-frame
//! emotion annotator and the per-session pipeline that drives it over a
//! real-time transport.

#![warn(clippy::all)]

pub mod annotation;
pub mod capture;
pub mod detector;
pub mod error;
pub mod font;
pub mod overlay;
pub mod processing;
pub mod tracks;
pub mod transport;

// Re-export main types
pub use annotation::{Analysis, FrameAnnotator, FrameOutcome};
pub use capture::{MediaStreamConstraints, VideoConstraints, VideoPixelFormat, VideoResolution};
pub use detector::{DetectionError, DetectionResult, EmotionDetector, ScriptedDetector};
pub use error::{ErrorCategory, MediaError, MediaResult};
pub use overlay::{OverlayStyle, TextOverlay};
pub use processing::{
    EmotionProcessor, PipelineConfig, PipelineEvent, PipelineStats, ProcessedFrame,
    VideoPipeline, VideoProcessor,
};
pub use tracks::VideoFrame;
pub use transport::{ChannelTransport, MediaTransport, TransportPeer};
