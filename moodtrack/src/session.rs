//! Per-browser-session controller
//!
//! A [`MoodSession`] owns the session state and the video pipeline of one
//! viewer. The UI calls [`MoodSession::start_camera`] and
//! [`MoodSession::stop_camera`] from its buttons and [`MoodSession::render`]
//! on every rerun; `render` mounts the pipeline while the camera flag is on
//! and tears it down once it is off.

use crate::config::SessionConfig;
use crate::event::{Event, EventStream};
use moodtrack_core::{EmotionLabel, MoodTrackError, MoodTrackResult, SessionState};
use moodtrack_media::{
    EmotionDetector, EmotionProcessor, MediaTransport, PipelineConfig, PipelineStats, TextOverlay,
    VideoPipeline,
};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Builds a fresh detector each time a pipeline is mounted
pub type DetectorFactory = Arc<dyn Fn() -> Box<dyn EmotionDetector> + Send + Sync>;

const EVENT_CAPACITY: usize = 128;
const FORWARDER_TIMEOUT: Duration = Duration::from_secs(1);

/// What a call to [`MoodSession::render`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// A new pipeline was mounted on a fresh transport
    Mounted,
    /// The camera is on and the pipeline was already running
    AlreadyStreaming,
    /// The camera is off and the running pipeline was torn down
    TornDown,
    /// The camera is off and nothing was running
    Idle,
}

/// One viewer's mood tracking session
pub struct MoodSession {
    id: Uuid,
    config: SessionConfig,
    state: Arc<RwLock<SessionState>>,
    detector_factory: DetectorFactory,
    pipeline: VideoPipeline,
    event_tx: broadcast::Sender<Event>,
    forwarder: Option<JoinHandle<()>>,
}

impl MoodSession {
    /// Create a session with the camera off
    pub fn new(config: SessionConfig, detector_factory: DetectorFactory) -> MoodTrackResult<Self> {
        config.validate()?;
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let id = Uuid::new_v4();
        debug!(session_id = %id, key = %config.key, "session created");

        Ok(Self {
            id,
            config,
            state: Arc::new(RwLock::new(SessionState::new())),
            detector_factory,
            pipeline: VideoPipeline::with_config(PipelineConfig::default()),
            event_tx,
            forwarder: None,
        })
    }

    /// Session ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Start action: set the camera flag. Takes effect on the next render.
    pub fn start_camera(&self) {
        let was_on = {
            let mut state = self.state.write();
            let was_on = state.is_camera_on();
            state.start();
            was_on
        };
        if !was_on {
            info!(session_id = %self.id, "camera started");
            let _ = self.event_tx.send(Event::CameraStarted {
                session_id: self.id,
            });
        }
    }

    /// Stop action: clear the camera flag. Takes effect on the next render.
    pub fn stop_camera(&self) {
        let was_on = {
            let mut state = self.state.write();
            let was_on = state.is_camera_on();
            state.stop();
            was_on
        };
        if was_on {
            info!(session_id = %self.id, "camera stopped");
            let _ = self.event_tx.send(Event::CameraStopped {
                session_id: self.id,
            });
        }
    }

    /// Bring the pipeline in line with the camera flag.
    ///
    /// `connect` is only called when a new pipeline is mounted and must
    /// return the transport the pipeline reads frames from.
    pub async fn render<T, F>(&mut self, connect: F) -> MoodTrackResult<RenderOutcome>
    where
        F: FnOnce(&SessionConfig) -> T,
        T: MediaTransport + 'static,
    {
        let mount = self.state.read().should_mount_pipeline();

        if mount {
            if self.pipeline.is_running() {
                return Ok(RenderOutcome::AlreadyStreaming);
            }
            // The previous stream may have ended on its own.
            self.teardown().await?;
            let transport = connect(&self.config);
            self.mount(transport).await?;
            return Ok(RenderOutcome::Mounted);
        }

        if self.pipeline.is_running() || self.forwarder.is_some() {
            self.teardown().await?;
            let _ = self.event_tx.send(Event::StreamTornDown {
                session_id: self.id,
            });
            return Ok(RenderOutcome::TornDown);
        }

        Ok(RenderOutcome::Idle)
    }

    async fn mount<T>(&mut self, transport: T) -> MoodTrackResult<()>
    where
        T: MediaTransport + 'static,
    {
        // Subscribe before starting so no pipeline event is missed.
        let pipeline_events = self.pipeline.subscribe_events();
        let processor = EmotionProcessor::new(
            (self.detector_factory)(),
            TextOverlay::new(self.config.overlay.clone()),
            self.state.clone(),
        );

        if let Err(e) = self.pipeline.start(transport, processor).await {
            let error: MoodTrackError = e.into();
            self.report_error(&error);
            return Err(error);
        }

        self.forwarder = Some(tokio::spawn(forward_events(
            self.id,
            pipeline_events,
            self.event_tx.clone(),
        )));

        info!(session_id = %self.id, key = %self.config.key, "stream mounted");
        let _ = self.event_tx.send(Event::StreamMounted {
            session_id: self.id,
        });
        Ok(())
    }

    async fn teardown(&mut self) -> MoodTrackResult<()> {
        let stopped = self.pipeline.stop().await;

        if let Some(mut forwarder) = self.forwarder.take() {
            if tokio::time::timeout(FORWARDER_TIMEOUT, &mut forwarder)
                .await
                .is_err()
            {
                forwarder.abort();
            }
        }

        if let Err(e) = stopped {
            let error: MoodTrackError = e.into();
            self.report_error(&error);
            return Err(error);
        }
        debug!(session_id = %self.id, "stream torn down");
        Ok(())
    }

    fn report_error(&self, error: &MoodTrackError) {
        warn!(session_id = %self.id, "session error: {}", error);
        let _ = self.event_tx.send(Event::SessionError {
            session_id: self.id,
            error: error.to_string(),
            recoverable: error.is_recoverable(),
        });
    }

    /// Subscribe to session events
    pub fn events(&self) -> EventStream {
        EventStream::new(self.event_tx.subscribe())
    }

    /// Most recent detected emotion
    pub fn last_emotion(&self) -> Option<EmotionLabel> {
        self.state.read().last_emotion().cloned()
    }

    /// Whether the camera flag is set
    pub fn is_camera_on(&self) -> bool {
        self.state.read().is_camera_on()
    }

    /// Whether a pipeline is currently processing frames
    pub fn is_streaming(&self) -> bool {
        self.pipeline.is_running()
    }

    /// Pipeline statistics, cumulative over every mount
    pub fn stats(&self) -> PipelineStats {
        self.pipeline.stats()
    }

    /// Snapshot of the session state
    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    /// Turn the camera off and release the pipeline
    pub async fn close(&mut self) -> MoodTrackResult<()> {
        self.stop_camera();
        let was_streaming = self.pipeline.is_running() || self.forwarder.is_some();
        self.teardown().await?;
        if was_streaming {
            let _ = self.event_tx.send(Event::StreamTornDown {
                session_id: self.id,
            });
        }
        info!(session_id = %self.id, "session closed");
        Ok(())
    }
}

impl Drop for MoodSession {
    fn drop(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
    }
}

impl std::fmt::Debug for MoodSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoodSession")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("state", &*self.state.read())
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

async fn forward_events(
    session_id: Uuid,
    mut pipeline_events: broadcast::Receiver<moodtrack_media::PipelineEvent>,
    event_tx: broadcast::Sender<Event>,
) {
    loop {
        match pipeline_events.recv().await {
            Ok(event) => {
                let Some(event) = Event::from_pipeline(session_id, event) else {
                    continue;
                };
                let ended = matches!(event, Event::StreamEnded { .. });
                let _ = event_tx.send(event);
                if ended {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(%session_id, skipped, "pipeline events lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
