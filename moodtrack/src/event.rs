//! Event system for session and stream events

use moodtrack_core::{EmotionLabel, MoodTrackError};
use moodtrack_media::PipelineEvent;
use tokio::sync::broadcast;
use tracing::warn;
use uuid::Uuid;

/// Events that can occur during a session
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The start camera action was taken
    CameraStarted {
        /// Session ID
        session_id: Uuid,
    },
    /// The stop camera action was taken
    CameraStopped {
        /// Session ID
        session_id: Uuid,
    },
    /// A video pipeline was mounted on a transport
    StreamMounted {
        /// Session ID
        session_id: Uuid,
    },
    /// The video pipeline was torn down and its transport released
    StreamTornDown {
        /// Session ID
        session_id: Uuid,
    },
    /// A different emotion is now shown on the stream
    EmotionDetected {
        /// Session ID
        session_id: Uuid,
        /// The emotion now shown
        label: EmotionLabel,
    },
    /// The face was lost
    FaceLost {
        /// Session ID
        session_id: Uuid,
    },
    /// A frame was sent on without annotation
    FramePassedThrough {
        /// Session ID
        session_id: Uuid,
        /// Frame sequence number
        sequence: u64,
        /// Why the frame was skipped
        reason: String,
    },
    /// The pipeline task exited
    StreamEnded {
        /// Session ID
        session_id: Uuid,
        /// Why it exited
        reason: String,
    },
    /// An error occurred in the session
    SessionError {
        /// Session ID
        session_id: Uuid,
        /// Error that occurred
        error: String,
        /// Whether this error is recoverable
        recoverable: bool,
    },
}

impl Event {
    /// Map a pipeline event into a session event. `Started` has no
    /// counterpart because mounting is reported by the session itself.
    pub fn from_pipeline(session_id: Uuid, event: PipelineEvent) -> Option<Self> {
        match event {
            PipelineEvent::Started => None,
            PipelineEvent::EmotionChanged { label } => {
                Some(Event::EmotionDetected { session_id, label })
            }
            PipelineEvent::FaceLost => Some(Event::FaceLost { session_id }),
            PipelineEvent::DetectionFailed { sequence, error } => {
                let error = MoodTrackError::from(error);
                Some(Event::SessionError {
                    session_id,
                    error: format!("frame {}: {}", sequence, error),
                    recoverable: error.is_recoverable(),
                })
            }
            PipelineEvent::FramePassedThrough { sequence, reason } => {
                Some(Event::FramePassedThrough {
                    session_id,
                    sequence,
                    reason,
                })
            }
            PipelineEvent::Stopped { reason } => Some(Event::StreamEnded { session_id, reason }),
        }
    }

    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::CameraStarted { .. } => "camera_started",
            Event::CameraStopped { .. } => "camera_stopped",
            Event::StreamMounted { .. } => "stream_mounted",
            Event::StreamTornDown { .. } => "stream_torn_down",
            Event::EmotionDetected { .. } => "emotion_detected",
            Event::FaceLost { .. } => "face_lost",
            Event::FramePassedThrough { .. } => "frame_passed_through",
            Event::StreamEnded { .. } => "stream_ended",
            Event::SessionError { .. } => "session_error",
        }
    }

    /// Session the event belongs to
    pub fn session_id(&self) -> Uuid {
        match self {
            Event::CameraStarted { session_id }
            | Event::CameraStopped { session_id }
            | Event::StreamMounted { session_id }
            | Event::StreamTornDown { session_id }
            | Event::EmotionDetected { session_id, .. }
            | Event::FaceLost { session_id }
            | Event::FramePassedThrough { session_id, .. }
            | Event::StreamEnded { session_id, .. }
            | Event::SessionError { session_id, .. } => *session_id,
        }
    }

    /// Check if this is an emotion-related event
    pub fn is_emotion_event(&self) -> bool {
        matches!(
            self,
            Event::EmotionDetected { .. } | Event::FaceLost { .. }
        )
    }

    /// Check if this is a stream lifecycle event
    pub fn is_stream_event(&self) -> bool {
        matches!(
            self,
            Event::StreamMounted { .. } | Event::StreamTornDown { .. } | Event::StreamEnded { .. }
        )
    }

    /// Check if this is an error event
    pub fn is_error_event(&self) -> bool {
        matches!(self, Event::SessionError { .. })
    }
}

/// Stream of session events for async iteration
#[derive(Debug)]
pub struct EventStream {
    receiver: broadcast::Receiver<Event>,
}

impl EventStream {
    /// Create a new event stream with a receiver
    pub fn new(receiver: broadcast::Receiver<Event>) -> Self {
        Self { receiver }
    }

    /// Get the next event from the stream.
    ///
    /// Events dropped because this stream fell behind are skipped.
    pub async fn next(&mut self) -> Option<Event> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Try to get the next event without blocking
    pub fn try_next(&mut self) -> Option<Event> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "event stream lagged");
                }
                Err(_) => return None,
            }
        }
    }
}
