//! # moodtrack - Live Mood Tracker
//!
//! Overlays the facial emotion detected in each frame of a browser video
//! stream back onto that frame, as `"😄 Happy (82.0%)"` or
//! `"😐 No face detected"`.
//!
//! ## Key Features
//!
//! - **Per-session state**: camera flag plus the last detected emotion
//! - **Pluggable detector**: any [`EmotionDetector`] can drive the overlay
//! - **Graceful teardown**: stopping the camera joins the pipeline task and
//!   releases its transport before the next start
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use moodtrack::{ChannelTransport, EmotionDetector, MoodTrack, ScriptedDetector, SessionConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mood_track = MoodTrack::init()?;
//!     let session = mood_track.create_session(
//!         SessionConfig::default(),
//!         Arc::new(|| Box::new(ScriptedDetector::new(Vec::new())) as Box<dyn EmotionDetector>),
//!     )?;
//!
//!     let mut session = session.lock().await;
//!     session.start_camera();
//!     let (transport, _peer) = ChannelTransport::pair(8);
//!     session.render(|_| transport).await?;
//!
//!     let mut events = session.events();
//!     session.stop_camera();
//!     session.render(|_| ChannelTransport::pair(1).0).await?;
//!     while let Some(event) = events.try_next() {
//!         println!("Session event: {:?}", event);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Re-export core types for easy access
pub use moodtrack_core::{
    capitalize, glyph_for, BoundingBox, CameraState, EmotionCategory, EmotionLabel,
    EmotionObservation, FaceRecord, MoodTrackError, MoodTrackResult, OverlayText, SessionState,
    DEFAULT_GLYPH, NEUTRAL_GLYPH, NO_FACE_TEXT, WAITING_TEXT,
};

pub use moodtrack_media::{
    ChannelTransport, DetectionError, DetectionResult, EmotionDetector, MediaError,
    MediaStreamConstraints, MediaTransport, OverlayStyle, PipelineStats, ScriptedDetector,
    TransportPeer, VideoFrame, VideoPixelFormat, VideoResolution,
};

// Public API modules
pub mod config;
pub mod event;
pub mod logging;
pub mod session;

// Re-export main API types
pub use config::{GlobalConfig, IceServer, RtcConfiguration, SessionConfig, DEFAULT_STUN_URL};
pub use event::{Event, EventStream};
pub use logging::init_logging;
pub use session::{DetectorFactory, MoodSession, RenderOutcome};

use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// Shared handle to a registered session
pub type SessionHandle = Arc<Mutex<MoodSession>>;

/// Main entry point: the process-wide session registry
#[derive(Debug, Clone)]
pub struct MoodTrack {
    inner: Arc<MoodTrackInner>,
}

#[derive(Debug)]
struct MoodTrackInner {
    config: GlobalConfig,
    sessions: DashMap<Uuid, SessionHandle>,
    // Slots reserved against `max_sessions`, taken before a session is built.
    reserved: AtomicUsize,
}

impl MoodTrack {
    /// Initialize with default settings
    ///
    /// # Example
    /// ```rust,no_run
    /// use moodtrack::MoodTrack;
    ///
    /// let mood_track = MoodTrack::init()?;
    /// # Ok::<(), moodtrack::MoodTrackError>(())
    /// ```
    pub fn init() -> MoodTrackResult<Self> {
        Self::init_with(GlobalConfig::default())
    }

    /// Initialize with custom global configuration
    pub fn init_with(config: GlobalConfig) -> MoodTrackResult<Self> {
        config.validate()?;
        if config.debug_logging {
            init_logging(&config.log_filter)?;
        }

        Ok(Self {
            inner: Arc::new(MoodTrackInner {
                config,
                sessions: DashMap::new(),
                reserved: AtomicUsize::new(0),
            }),
        })
    }

    /// Global configuration
    pub fn config(&self) -> &GlobalConfig {
        &self.inner.config
    }

    /// Create and register a session with the camera off
    pub fn create_session(
        &self,
        config: SessionConfig,
        detector_factory: DetectorFactory,
    ) -> MoodTrackResult<SessionHandle> {
        let limit = self.inner.config.max_sessions;
        let reserved = self
            .inner
            .reserved
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                (count < limit).then_some(count + 1)
            });
        if reserved.is_err() {
            warn!(limit, "session limit reached");
            return Err(MoodTrackError::SessionLimitExceeded { limit });
        }

        let session = match MoodSession::new(config, detector_factory) {
            Ok(session) => session,
            Err(e) => {
                self.inner.reserved.fetch_sub(1, Ordering::AcqRel);
                return Err(e);
            }
        };
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        self.inner.sessions.insert(id, handle.clone());
        info!(session_id = %id, "session registered");
        Ok(handle)
    }

    /// Look up a registered session
    pub fn session(&self, id: Uuid) -> MoodTrackResult<SessionHandle> {
        self.inner
            .sessions
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| MoodTrackError::SessionNotFound {
                session_id: id.to_string(),
            })
    }

    /// Close a session and remove it from the registry
    pub async fn end_session(&self, id: Uuid) -> MoodTrackResult<()> {
        let (_, handle) =
            self.inner
                .sessions
                .remove(&id)
                .ok_or_else(|| MoodTrackError::SessionNotFound {
                    session_id: id.to_string(),
                })?;
        self.inner.reserved.fetch_sub(1, Ordering::AcqRel);
        let result = handle.lock().await.close().await;
        info!(session_id = %id, "session ended");
        result
    }

    /// Number of registered sessions
    pub fn session_count(&self) -> usize {
        self.inner.sessions.len()
    }

    /// Close every session. Sessions are closed concurrently and all of them
    /// are removed even if some fail; the first error is returned.
    pub async fn shutdown(&self) -> MoodTrackResult<()> {
        let ids: Vec<Uuid> = self.inner.sessions.iter().map(|entry| *entry.key()).collect();
        let results = futures::future::join_all(ids.into_iter().map(|id| self.end_session(id))).await;
        info!(sessions = results.len(), "mood tracker shut down");
        results.into_iter().collect()
    }
}
