//! Per-session video pipeline
//!
//! The host's media layer calls back once per frame. Here that callback is a
//! [`VideoProcessor`], driven by a single tokio task that pulls frames from a
//! [`MediaTransport`], processes them strictly one after another and sends
//! the result back over the same transport.

use crate::annotation::{FrameAnnotator, FrameOutcome};
use crate::detector::EmotionDetector;
use crate::error::{MediaError, MediaResult};
use crate::overlay::TextOverlay;
use crate::tracks::VideoFrame;
use crate::transport::MediaTransport;
use moodtrack_core::{EmotionLabel, OverlayText, SessionState};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A frame after processing, with what happened to it
#[derive(Debug, Clone)]
pub struct ProcessedFrame {
    pub frame: VideoFrame,
    pub outcome: FrameOutcome,
}

/// Per-frame callback registered with the pipeline driver
pub trait VideoProcessor: Send {
    fn process(&mut self, frame: VideoFrame) -> ProcessedFrame;
}

/// [`VideoProcessor`] that overlays the detected emotion on every frame
pub struct EmotionProcessor<D> {
    annotator: FrameAnnotator<D>,
    state: Arc<RwLock<SessionState>>,
}

impl<D: EmotionDetector> EmotionProcessor<D> {
    /// Create a processor writing into the session's shared state
    pub fn new(detector: D, overlay: TextOverlay, state: Arc<RwLock<SessionState>>) -> Self {
        Self {
            annotator: FrameAnnotator::new(detector, overlay),
            state,
        }
    }

    /// Text drawn on the most recent frame
    pub fn current_text(&self) -> &OverlayText {
        self.annotator.current_text()
    }
}

impl<D: EmotionDetector> VideoProcessor for EmotionProcessor<D> {
    fn process(&mut self, frame: VideoFrame) -> ProcessedFrame {
        // The lock is only taken to store a detected label, never across detection.
        let state = &self.state;
        let (frame, outcome) = self
            .annotator
            .annotate_with(frame, |label| state.write().record_emotion(label));
        ProcessedFrame { frame, outcome }
    }
}

impl<D> std::fmt::Debug for EmotionProcessor<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmotionProcessor")
            .field("annotator", &self.annotator)
            .finish_non_exhaustive()
    }
}

/// Pipeline events
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// The processing task is running
    Started,
    /// A different emotion is now shown
    EmotionChanged { label: EmotionLabel },
    /// The face was lost and the no-face text is shown
    FaceLost,
    /// The detector failed on a frame, which was annotated as no face
    DetectionFailed { sequence: u64, error: MediaError },
    /// A frame could not be annotated and was sent on unmodified
    FramePassedThrough { sequence: u64, reason: String },
    /// The processing task has exited and released its transport
    Stopped { reason: String },
}

/// Pipeline statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineStats {
    pub frames_received: u64,
    pub frames_annotated: u64,
    pub frames_passed_through: u64,
    pub faces_detected: u64,
    pub no_face_frames: u64,
    pub detection_failures: u64,
    pub average_processing_time: Duration,
    pub last_processing_time: Duration,
}

impl PipelineStats {
    fn record(&mut self, outcome: &FrameOutcome, elapsed: Duration) {
        self.frames_received += 1;
        match outcome {
            FrameOutcome::Annotated {
                text,
                detection_error,
            } => {
                self.frames_annotated += 1;
                if detection_error.is_some() {
                    self.detection_failures += 1;
                }
                match text {
                    OverlayText::Emotion(_) => self.faces_detected += 1,
                    _ => self.no_face_frames += 1,
                }
            }
            FrameOutcome::PassedThrough { .. } => self.frames_passed_through += 1,
        }

        let n = self.frames_received as f64;
        let average = (self.average_processing_time.as_secs_f64() * (n - 1.0)
            + elapsed.as_secs_f64())
            / n;
        self.average_processing_time = Duration::from_secs_f64(average);
        self.last_processing_time = elapsed;
    }
}

/// Turns frame outcomes into change events
#[derive(Debug, Default)]
struct EventTracker {
    showing: Option<String>,
}

impl EventTracker {
    fn observe(&mut self, sequence: u64, outcome: &FrameOutcome) -> Option<PipelineEvent> {
        match outcome {
            FrameOutcome::PassedThrough { reason } => Some(PipelineEvent::FramePassedThrough {
                sequence,
                reason: reason.clone(),
            }),
            FrameOutcome::Annotated {
                text: OverlayText::Emotion(label),
                ..
            } => {
                let name = label.name.to_lowercase();
                if self.showing.as_deref() == Some(name.as_str()) {
                    return None;
                }
                self.showing = Some(name);
                Some(PipelineEvent::EmotionChanged {
                    label: label.clone(),
                })
            }
            FrameOutcome::Annotated { .. } => {
                self.showing.take().map(|_| PipelineEvent::FaceLost)
            }
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// How long `stop` waits for the task before aborting it
    pub shutdown_timeout: Duration,
    /// Capacity of the event broadcast channel
    pub event_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout: Duration::from_secs(2),
            event_capacity: 64,
        }
    }
}

/// Owns the processing task of one session
pub struct VideoPipeline {
    config: PipelineConfig,
    stats: Arc<RwLock<PipelineStats>>,
    event_tx: broadcast::Sender<PipelineEvent>,
    shutdown_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl VideoPipeline {
    /// Create new video pipeline
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Create new video pipeline with custom configuration
    pub fn with_config(config: PipelineConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            config,
            stats: Arc::new(RwLock::new(PipelineStats::default())),
            event_tx,
            shutdown_tx: None,
            task: None,
        }
    }

    /// Start processing frames from `transport` with `processor`
    pub async fn start<T, P>(&mut self, transport: T, processor: P) -> MediaResult<()>
    where
        T: MediaTransport + 'static,
        P: VideoProcessor + 'static,
    {
        if self.is_running() {
            return Err(MediaError::PipelineAlreadyRunning);
        }
        // A task that ended on its own (peer hung up) leaves a finished handle.
        self.task = None;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let stats = self.stats.clone();
        let event_tx = self.event_tx.clone();

        let task = tokio::spawn(run_pipeline(
            transport,
            processor,
            stats,
            event_tx,
            shutdown_rx,
        ));

        self.shutdown_tx = Some(shutdown_tx);
        self.task = Some(task);
        info!("video pipeline started");
        Ok(())
    }

    /// Stop processing and release the transport.
    ///
    /// Returns once the task has exited. A frame being processed is allowed
    /// to finish. Stopping an idle pipeline is a no-op.
    pub async fn stop(&mut self) -> MediaResult<()> {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(true);
        }

        let Some(mut task) = self.task.take() else {
            return Ok(());
        };

        match tokio::time::timeout(self.config.shutdown_timeout, &mut task).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(MediaError::InvalidState {
                message: format!("pipeline task failed: {}", e),
            }),
            Err(_) => {
                warn!(
                    timeout = ?self.config.shutdown_timeout,
                    "pipeline did not stop in time, aborting"
                );
                task.abort();
                Err(MediaError::Timeout {
                    duration: self.config.shutdown_timeout,
                })
            }
        }
    }

    /// Whether the processing task is alive
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Get current statistics
    pub fn stats(&self) -> PipelineStats {
        (*self.stats.read()).clone()
    }

    /// Subscribe to pipeline events
    pub fn subscribe_events(&self) -> broadcast::Receiver<PipelineEvent> {
        self.event_tx.subscribe()
    }
}

impl Default for VideoPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for VideoPipeline {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for VideoPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoPipeline")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

async fn run_pipeline<T, P>(
    mut transport: T,
    mut processor: P,
    stats: Arc<RwLock<PipelineStats>>,
    event_tx: broadcast::Sender<PipelineEvent>,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    T: MediaTransport,
    P: VideoProcessor,
{
    let _ = event_tx.send(PipelineEvent::Started);
    let mut tracker = EventTracker::default();

    let reason = loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.changed() => break "stopped".to_string(),

            received = transport.recv_frame() => match received {
                Ok(Some(frame)) => {
                    let sequence = frame.sequence;
                    let started = Instant::now();
                    let ProcessedFrame { frame, outcome } = processor.process(frame);
                    stats.write().record(&outcome, started.elapsed());

                    if let FrameOutcome::Annotated { detection_error: Some(error), .. } = &outcome {
                        let _ = event_tx.send(PipelineEvent::DetectionFailed {
                            sequence,
                            error: error.clone(),
                        });
                    }
                    if let Some(event) = tracker.observe(sequence, &outcome) {
                        debug!(?event, "pipeline event");
                        let _ = event_tx.send(event);
                    }

                    if let Err(e) = transport.send_frame(frame).await {
                        warn!(sequence, "failed to send annotated frame: {}", e);
                        break e.to_string();
                    }
                }
                Ok(None) => break "transport ended".to_string(),
                Err(e) => {
                    warn!("failed to receive frame: {}", e);
                    break e.to_string();
                }
            },
        }
    };

    if let Err(e) = transport.close().await {
        warn!("failed to close transport: {}", e);
    }
    info!(%reason, "video pipeline stopped");
    let _ = event_tx.send(PipelineEvent::Stopped { reason });
}
