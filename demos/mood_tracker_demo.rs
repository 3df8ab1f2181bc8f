//! Mood tracker demo
//!
//! Drives one session through start, a few frames and stop, with a scripted
//! detector standing in for the face model. Run with
//! `RUST_LOG=debug cargo run --example mood_tracker_demo` for per-frame logs.

use moodtrack::*;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging("info")?;

    let script: Vec<DetectionResult> = vec![
        Ok(vec![face(&[("happy", 0.82), ("neutral", 0.10), ("sad", 0.08)])]),
        Ok(vec![face(&[("surprise", 0.455), ("fear", 0.30)])]),
        Ok(vec![]),
        Err(DetectionError::Model {
            reason: "model warming up".to_string(),
        }),
        Ok(vec![face(&[("angry", 0.61), ("disgust", 0.20)])]),
    ];
    let factory: DetectorFactory =
        Arc::new(move || Box::new(ScriptedDetector::new(script.clone())) as Box<dyn EmotionDetector>);

    let config = SessionConfig::default();
    println!("🌐 RTC configuration: {}", config.rtc.to_json()?);

    let mut session = MoodSession::new(config, factory)?;
    let mut events = session.events();

    println!("▶️  Start");
    session.start_camera();
    let (transport, mut peer) = ChannelTransport::pair(8);
    println!("🎬 Render: {:?}", session.render(|_| transport).await?);

    for sequence in 1..=5 {
        let frame = VideoFrame::blank(VideoResolution::P360, VideoPixelFormat::BGR24)
            .with_timing(sequence * 33_333, sequence);
        peer.send(frame).await?;
        if let Ok(Some(annotated)) = tokio::time::timeout(Duration::from_secs(1), peer.recv()).await {
            let lit = annotated.data.iter().filter(|&&b| b == 255).count();
            println!(
                "🖼️  Frame {} annotated ({} overlay bytes), last emotion: {}",
                annotated.sequence,
                lit,
                session
                    .last_emotion()
                    .map(|label| label.to_string())
                    .unwrap_or_else(|| "none".to_string())
            );
        }
    }

    println!("⏹️  Stop");
    session.stop_camera();
    println!("🎬 Render: {:?}", session.render(|_| ChannelTransport::pair(1).0).await?);

    while let Some(event) = events.try_next() {
        println!("📣 {}: {:?}", event.event_type(), event);
    }

    let stats = session.stats();
    println!("📊 Stats: {}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn face(scores: &[(&str, f32)]) -> FaceRecord {
    FaceRecord::new(scores.iter().map(|(name, score)| (name.to_string(), *score)).collect())
}
