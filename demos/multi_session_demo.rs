//! Multi-session demo
//!
//! Several viewers share one process; each gets its own session state and
//! pipeline from the registry.

use moodtrack::*;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mood_track = MoodTrack::init_with(GlobalConfig {
        debug_logging: true,
        max_sessions: 3,
        ..GlobalConfig::default()
    })?;

    let mut peers = Vec::new();
    for (viewer, emotion) in ["happy", "sad", "neutral"].into_iter().enumerate() {
        let script: Vec<DetectionResult> = vec![Ok(vec![FaceRecord::new(
            EmotionObservation::new().with_score(emotion, 0.5 + viewer as f32 * 0.1),
        )])];
        let factory: DetectorFactory = Arc::new(move || {
            Box::new(ScriptedDetector::cycling(script.clone())) as Box<dyn EmotionDetector>
        });

        let handle = mood_track.create_session(
            SessionConfig {
                key: format!("viewer-{}", viewer),
                ..SessionConfig::default()
            },
            factory,
        )?;
        let mut session = handle.lock().await;
        session.start_camera();
        let (transport, peer) = ChannelTransport::pair(4);
        session.render(|_| transport).await?;
        peers.push((session.id(), peer));
    }

    match mood_track.create_session(SessionConfig::default(), Arc::new(|| {
        Box::new(ScriptedDetector::default()) as Box<dyn EmotionDetector>
    })) {
        Err(e) => println!("🚫 Fourth viewer rejected: {}", e),
        Ok(_) => println!("⚠️  Fourth viewer unexpectedly accepted"),
    }

    for (id, peer) in peers.iter_mut() {
        let frame = VideoFrame::blank(VideoResolution::P360, VideoPixelFormat::RGB24);
        peer.send(frame).await?;
        tokio::time::timeout(Duration::from_secs(1), peer.recv()).await?;

        let session = mood_track.session(*id)?;
        let session = session.lock().await;
        println!(
            "👤 {} ({}): {}",
            session.config().key,
            id,
            session
                .last_emotion()
                .map(|label| label.to_string())
                .unwrap_or_else(|| WAITING_TEXT.to_string())
        );
    }

    mood_track.shutdown().await?;
    println!("✅ {} sessions left", mood_track.session_count());
    Ok(())
}
