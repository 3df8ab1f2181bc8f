//! Error types for the mood tracker

use thiserror::Error;

/// Main error type for mood tracker operations
#[derive(Error, Debug)]
pub enum MoodTrackError {
    /// Initialization error
    #[error("Initialization failed: {reason}")]
    Initialization {
        /// Reason for initialization failure
        reason: String,
    },

    /// Missing configuration error
    #[error("Missing required configuration: {field}")]
    MissingConfiguration {
        /// Missing configuration field
        field: String,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message
        message: String,
    },

    /// Emotion detection failed for a frame
    #[error("Emotion detection failed: {reason}")]
    Detection {
        /// Reason reported by the detector
        reason: String,
    },

    /// Media processing error
    #[error("Media processing error: {reason}")]
    MediaProcessing {
        /// Reason for media error
        reason: String,
    },

    /// Transport error
    #[error("Transport error: {reason}")]
    Transport {
        /// Reason for transport error
        reason: String,
    },

    /// Session lookup failed
    #[error("Session not found: {session_id}")]
    SessionNotFound {
        /// Session identifier
        session_id: String,
    },

    /// Session limit exceeded
    #[error("Session limit exceeded: {limit}")]
    SessionLimitExceeded {
        /// Maximum number of sessions allowed
        limit: usize,
    },
}

/// Result type alias for mood tracker operations
pub type MoodTrackResult<T> = Result<T, MoodTrackError>;

impl MoodTrackError {
    /// Check if the error only affects a single frame or request
    pub fn is_recoverable(&self) -> bool {
        match self {
            MoodTrackError::Detection { .. } => true,
            MoodTrackError::MediaProcessing { .. } => true,
            MoodTrackError::Transport { .. } => true,
            MoodTrackError::SessionLimitExceeded { .. } => true,
            MoodTrackError::Initialization { .. } => false,
            MoodTrackError::MissingConfiguration { .. } => false,
            MoodTrackError::InvalidConfiguration { .. } => false,
            _ => false,
        }
    }
}
