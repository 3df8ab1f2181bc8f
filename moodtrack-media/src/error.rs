//! Media processing error types and handling
//!
//! This module defines the error types used by frame validation, overlay
//! rendering, the detector seam and the video pipeline.

use moodtrack_core::MoodTrackError;
use thiserror::Error;

/// Main error type for media processing operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MediaError {
    /// Invalid configuration provided
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message
        message: String,
    },

    /// Unsupported format error
    #[error("Unsupported format: {format}")]
    UnsupportedFormat {
        /// Format description
        format: String,
    },

    /// Invalid frame data error
    #[error("Invalid frame data: expected {expected} bytes, got {actual}")]
    InvalidFrameData {
        /// Expected data size
        expected: usize,
        /// Actual data size
        actual: usize,
    },

    /// Frame with a zero dimension
    #[error("Invalid frame dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Frame width
        width: u32,
        /// Frame height
        height: u32,
    },

    /// Emotion detector failed
    #[error("Detection failed: {detector} - {reason}")]
    DetectionFailed {
        /// Detector name
        detector: String,
        /// Failure reason
        reason: String,
    },

    /// Transport was closed by the peer
    #[error("Transport closed")]
    TransportClosed,

    /// Pipeline already running error
    #[error("Pipeline already running")]
    PipelineAlreadyRunning,

    /// Timeout error
    #[error("Operation timed out after {duration:?}")]
    Timeout {
        /// Duration after which timeout occurred
        duration: std::time::Duration,
    },

    /// Invalid state for operation
    #[error("Invalid state: {message}")]
    InvalidState {
        /// State error message
        message: String,
    },
}

/// Result type alias for media operations
pub type MediaResult<T> = Result<T, MediaError>;

impl MediaError {
    /// Check if the error only affects the current frame
    pub fn is_recoverable(&self) -> bool {
        match self {
            MediaError::Timeout { .. } => true,
            MediaError::UnsupportedFormat { .. } => true,
            MediaError::InvalidFrameData { .. } => true,
            MediaError::InvalidDimensions { .. } => true,
            MediaError::DetectionFailed { .. } => true,
            MediaError::TransportClosed => false,
            MediaError::InvalidConfiguration { .. } => false,
            _ => false,
        }
    }

    /// Get error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            MediaError::InvalidConfiguration { .. } => ErrorCategory::Configuration,
            MediaError::UnsupportedFormat { .. } => ErrorCategory::Format,
            MediaError::InvalidFrameData { .. } => ErrorCategory::Data,
            MediaError::InvalidDimensions { .. } => ErrorCategory::Data,
            MediaError::DetectionFailed { .. } => ErrorCategory::Detection,
            MediaError::TransportClosed => ErrorCategory::Transport,
            MediaError::PipelineAlreadyRunning => ErrorCategory::State,
            MediaError::Timeout { .. } => ErrorCategory::System,
            MediaError::InvalidState { .. } => ErrorCategory::State,
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Timeouts and task failures
    System,
    /// Configuration and parameter errors
    Configuration,
    /// Pixel format errors
    Format,
    /// Frame buffer validation errors
    Data,
    /// Emotion detector errors
    Detection,
    /// Transport errors
    Transport,
    /// State management errors
    State,
}

impl From<MediaError> for MoodTrackError {
    fn from(error: MediaError) -> Self {
        match error {
            MediaError::InvalidConfiguration { message } => {
                MoodTrackError::InvalidConfiguration { message }
            }
            MediaError::DetectionFailed { reason, .. } => MoodTrackError::Detection { reason },
            MediaError::TransportClosed => MoodTrackError::Transport {
                reason: "transport closed".to_string(),
            },
            other => MoodTrackError::MediaProcessing {
                reason: other.to_string(),
            },
        }
    }
}
