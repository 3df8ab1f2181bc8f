//! Tests for sessions and the session registry

use moodtrack::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

// ============================================================================
// HELPERS
// ============================================================================

fn scripted(script: Vec<DetectionResult>) -> DetectorFactory {
    Arc::new(move || Box::new(ScriptedDetector::new(script.clone())) as Box<dyn EmotionDetector>)
}

fn happy() -> DetectionResult {
    Ok(vec![FaceRecord::new(
        EmotionObservation::new()
            .with_score("happy", 0.82)
            .with_score("neutral", 0.10)
            .with_score("sad", 0.08),
    )])
}

fn frame(sequence: u64) -> VideoFrame {
    VideoFrame::blank(VideoResolution::P360, VideoPixelFormat::BGR24).with_timing(0, sequence)
}

async fn next_event(events: &mut EventStream) -> Event {
    timeout(Duration::from_secs(1), events.next())
        .await
        .expect("event timed out")
        .expect("event stream closed")
}

async fn roundtrip(peer: &mut TransportPeer, sequence: u64) -> VideoFrame {
    peer.send(frame(sequence)).await.unwrap();
    timeout(Duration::from_secs(1), peer.recv())
        .await
        .expect("frame timed out")
        .expect("transport closed")
}

// ============================================================================
// CAMERA CONTROL
// ============================================================================

#[tokio::test]
async fn test_start_stop_start_leaves_camera_on() {
    let session = MoodSession::new(SessionConfig::default(), scripted(vec![])).unwrap();
    assert!(!session.is_camera_on());

    session.start_camera();
    session.stop_camera();
    session.start_camera();

    assert!(session.is_camera_on());
    assert_eq!(session.state().camera(), CameraState::On);
    assert_eq!(session.last_emotion(), None);
}

#[tokio::test]
async fn test_render_with_camera_off_is_idle() {
    let mut session = MoodSession::new(SessionConfig::default(), scripted(vec![])).unwrap();

    let outcome = session
        .render(|_: &SessionConfig| -> ChannelTransport { unreachable!("camera is off") })
        .await
        .unwrap();

    assert_eq!(outcome, RenderOutcome::Idle);
    assert!(!session.is_streaming());
}

// ============================================================================
// STREAM LIFECYCLE
// ============================================================================

#[tokio::test]
async fn test_render_mounts_and_tears_down() {
    let mut session = MoodSession::new(SessionConfig::default(), scripted(vec![happy()])).unwrap();
    let (transport, mut peer) = ChannelTransport::pair(4);

    session.start_camera();
    let outcome = session
        .render(|config| {
            assert_eq!(config.key, "mood");
            transport
        })
        .await
        .unwrap();
    assert_eq!(outcome, RenderOutcome::Mounted);
    assert!(session.is_streaming());

    let again = session
        .render(|_: &SessionConfig| -> ChannelTransport { unreachable!("already mounted") })
        .await
        .unwrap();
    assert_eq!(again, RenderOutcome::AlreadyStreaming);

    let annotated = roundtrip(&mut peer, 1).await;
    assert_ne!(annotated, frame(1));
    assert_eq!(
        session.last_emotion().map(|label| label.to_string()).as_deref(),
        Some("😄 Happy (82.0%)")
    );

    session.stop_camera();
    let outcome = session
        .render(|_: &SessionConfig| -> ChannelTransport { unreachable!("camera is off") })
        .await
        .unwrap();
    assert_eq!(outcome, RenderOutcome::TornDown);
    assert!(!session.is_streaming());
    assert!(peer.is_closed());
    assert_eq!(peer.recv().await, None);
}

#[tokio::test]
async fn test_restart_mounts_a_fresh_transport() {
    let mut session = MoodSession::new(SessionConfig::default(), scripted(vec![happy()])).unwrap();

    session.start_camera();
    let (first, first_peer) = ChannelTransport::pair(1);
    session.render(|_| first).await.unwrap();

    session.stop_camera();
    session.render(|_| ChannelTransport::pair(1).0).await.unwrap();
    assert!(first_peer.is_closed());

    session.start_camera();
    let (second, mut second_peer) = ChannelTransport::pair(1);
    assert_eq!(
        session.render(|_| second).await.unwrap(),
        RenderOutcome::Mounted
    );
    roundtrip(&mut second_peer, 1).await;

    let stats = session.stats();
    assert_eq!(stats.frames_received, 1);
    assert_eq!(stats.faces_detected, 1);
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_remount_after_peer_hangup() {
    let mut session = MoodSession::new(SessionConfig::default(), scripted(vec![])).unwrap();
    let mut events = session.events();

    session.start_camera();
    let (transport, peer) = ChannelTransport::pair(1);
    session.render(|_| transport).await.unwrap();
    drop(peer);

    loop {
        if let Event::StreamEnded { reason, .. } = next_event(&mut events).await {
            assert_eq!(reason, "transport ended");
            break;
        }
    }
    timeout(Duration::from_secs(1), async {
        while session.is_streaming() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("pipeline task did not exit");

    let (transport, _peer) = ChannelTransport::pair(1);
    assert_eq!(
        session.render(|_| transport).await.unwrap(),
        RenderOutcome::Mounted
    );
    assert!(session.is_streaming());
    session.close().await.unwrap();
}

#[derive(Debug)]
struct SlowDetector {
    delay: Duration,
}

impl EmotionDetector for SlowDetector {
    fn detect_emotions(&mut self, _frame: &VideoFrame) -> DetectionResult {
        std::thread::sleep(self.delay);
        happy()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_state_reads_do_not_wait_for_detection() {
    let factory: DetectorFactory = Arc::new(|| {
        Box::new(SlowDetector {
            delay: Duration::from_millis(400),
        }) as Box<dyn EmotionDetector>
    });
    let mut session = MoodSession::new(SessionConfig::default(), factory).unwrap();
    let (transport, mut peer) = ChannelTransport::pair(4);

    session.start_camera();
    session.render(|_| transport).await.unwrap();
    peer.send(frame(1)).await.unwrap();

    // Let the pipeline task enter the detector.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let started = std::time::Instant::now();
    assert!(session.is_camera_on());
    assert_eq!(session.last_emotion(), None);
    assert!(started.elapsed() < Duration::from_millis(100));

    timeout(Duration::from_secs(2), peer.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.last_emotion().unwrap().name, "happy");
    session.close().await.unwrap();
}

// ============================================================================
// LAST EMOTION
// ============================================================================

#[tokio::test]
async fn test_no_face_keeps_last_emotion() {
    let mut session =
        MoodSession::new(SessionConfig::default(), scripted(vec![happy(), Ok(vec![])])).unwrap();
    let (transport, mut peer) = ChannelTransport::pair(4);

    session.start_camera();
    session.render(|_| transport).await.unwrap();

    roundtrip(&mut peer, 1).await;
    roundtrip(&mut peer, 2).await;

    let label = session.last_emotion().unwrap();
    assert_eq!(label.name, "happy");
    assert_eq!(session.stats().no_face_frames, 1);

    // Closing does not forget the label either.
    session.close().await.unwrap();
    assert!(!session.is_camera_on());
    assert_eq!(session.last_emotion().unwrap().name, "happy");
}

// ============================================================================
// EVENTS
// ============================================================================

#[tokio::test]
async fn test_session_event_sequence() {
    let mut session = MoodSession::new(SessionConfig::default(), scripted(vec![happy()])).unwrap();
    let mut events = session.events();
    let (transport, mut peer) = ChannelTransport::pair(4);
    let id = session.id();

    session.start_camera();
    session.render(|_| transport).await.unwrap();
    assert_eq!(
        next_event(&mut events).await,
        Event::CameraStarted { session_id: id }
    );
    assert_eq!(
        next_event(&mut events).await,
        Event::StreamMounted { session_id: id }
    );

    roundtrip(&mut peer, 1).await;
    match next_event(&mut events).await {
        Event::EmotionDetected { session_id, label } => {
            assert_eq!(session_id, id);
            assert_eq!(label.to_string(), "😄 Happy (82.0%)");
        }
        other => panic!("Expected EmotionDetected, got {:?}", other),
    }

    session.stop_camera();
    session
        .render(|_: &SessionConfig| -> ChannelTransport { unreachable!("camera is off") })
        .await
        .unwrap();

    assert_eq!(
        next_event(&mut events).await,
        Event::CameraStopped { session_id: id }
    );
    assert_eq!(
        next_event(&mut events).await,
        Event::StreamEnded {
            session_id: id,
            reason: "stopped".to_string()
        }
    );
    let torn_down = next_event(&mut events).await;
    assert_eq!(torn_down, Event::StreamTornDown { session_id: id });
    assert!(torn_down.is_stream_event());
}

// ============================================================================
// REGISTRY
// ============================================================================

#[tokio::test]
async fn test_registry_enforces_session_limit() {
    let mood_track = MoodTrack::init_with(GlobalConfig {
        max_sessions: 2,
        ..GlobalConfig::default()
    })
    .unwrap();

    let first = mood_track
        .create_session(SessionConfig::default(), scripted(vec![]))
        .unwrap();
    mood_track
        .create_session(SessionConfig::default(), scripted(vec![]))
        .unwrap();

    let err = mood_track
        .create_session(SessionConfig::default(), scripted(vec![]))
        .unwrap_err();
    assert!(matches!(err, MoodTrackError::SessionLimitExceeded { limit: 2 }));

    let id = first.lock().await.id();
    tokio_test::assert_ok!(mood_track.end_session(id).await);
    assert_eq!(mood_track.session_count(), 1);
    assert!(mood_track
        .create_session(SessionConfig::default(), scripted(vec![]))
        .is_ok());
}

#[test]
fn test_concurrent_creates_respect_session_limit() {
    let mood_track = MoodTrack::init_with(GlobalConfig {
        max_sessions: 2,
        ..GlobalConfig::default()
    })
    .unwrap();

    let created = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let mood_track = mood_track.clone();
                scope.spawn(move || {
                    mood_track
                        .create_session(SessionConfig::default(), scripted(vec![]))
                        .is_ok()
                })
            })
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .filter(|ok| *ok)
            .count()
    });

    assert_eq!(created, 2);
    assert_eq!(mood_track.session_count(), 2);
}

#[test]
fn test_rejected_config_does_not_use_a_slot() {
    let mood_track = MoodTrack::init_with(GlobalConfig {
        max_sessions: 1,
        ..GlobalConfig::default()
    })
    .unwrap();

    let bad = SessionConfig {
        key: String::new(),
        ..SessionConfig::default()
    };
    assert!(mood_track.create_session(bad, scripted(vec![])).is_err());
    assert!(mood_track
        .create_session(SessionConfig::default(), scripted(vec![]))
        .is_ok());
}

#[tokio::test]
async fn test_registry_lookup_and_shutdown() -> anyhow::Result<()> {
    let mood_track = MoodTrack::init()?;
    let handle = mood_track.create_session(SessionConfig::default(), scripted(vec![]))?;
    let (transport, peer) = ChannelTransport::pair(1);

    let id = {
        let mut session = handle.lock().await;
        session.start_camera();
        session.render(|_| transport).await?;
        session.id()
    };

    let found = mood_track.session(id)?;
    assert!(Arc::ptr_eq(&found, &handle));
    assert!(matches!(
        mood_track.session(uuid::Uuid::new_v4()),
        Err(MoodTrackError::SessionNotFound { .. })
    ));

    mood_track.shutdown().await?;
    assert_eq!(mood_track.session_count(), 0);
    assert!(peer.is_closed());
    assert!(!handle.lock().await.is_streaming());
    assert!(mood_track.end_session(id).await.is_err());
    Ok(())
}
