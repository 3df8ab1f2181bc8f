//! Tests for the per-frame emotion annotation
//!
//! Covers the display text produced for detector results, the first-face and
//! first-entry tie-break policies, and the pass-through behavior for frames
//! that cannot be drawn into.

use moodtrack_core::{EmotionLabel, EmotionObservation, FaceRecord, OverlayText, SessionState};
use moodtrack_media::*;

// ============================================================================
// HELPERS
// ============================================================================

fn frame() -> VideoFrame {
    VideoFrame::blank(VideoResolution::P360, VideoPixelFormat::BGR24)
}

fn face(scores: &[(&str, f32)]) -> FaceRecord {
    FaceRecord::new(scores.iter().map(|(name, score)| (*name, *score)).collect())
}

fn annotator(script: Vec<DetectionResult>) -> FrameAnnotator<ScriptedDetector> {
    FrameAnnotator::new(ScriptedDetector::new(script), TextOverlay::default())
}

fn drawn_text(outcome: &FrameOutcome) -> String {
    outcome.text().expect("frame should be annotated").to_string()
}

// ============================================================================
// DISPLAY TEXT
// ============================================================================

#[test]
fn test_happy_face_text() {
    let mut annotator = annotator(vec![Ok(vec![face(&[
        ("happy", 0.82),
        ("neutral", 0.10),
        ("sad", 0.08),
    ])])]);
    let mut state = SessionState::new();

    let (_, outcome) = annotator.annotate(frame(), &mut state);

    assert_eq!(drawn_text(&outcome), "😄 Happy (82.0%)");
    assert_eq!(state.last_emotion_label().as_deref(), Some("😄 Happy (82.0%)"));
}

#[test]
fn test_surprise_face_text() {
    let mut annotator = annotator(vec![Ok(vec![face(&[
        ("angry", 0.1),
        ("surprise", 0.455),
        ("fear", 0.2),
    ])])]);
    let mut state = SessionState::new();

    let (_, outcome) = annotator.annotate(frame(), &mut state);
    assert_eq!(drawn_text(&outcome), "😲 Surprise (45.5%)");
}

#[test]
fn test_glyph_matches_argmax_for_every_category() {
    for category in moodtrack_core::EmotionCategory::ALL {
        let mut observation = EmotionObservation::new();
        for other in moodtrack_core::EmotionCategory::ALL {
            let score = if other == category { 0.7 } else { 0.05 };
            observation.insert(other.as_str(), score);
        }
        let mut annotator = annotator(vec![Ok(vec![FaceRecord::new(observation)])]);
        let mut state = SessionState::new();

        let (_, outcome) = annotator.annotate(frame(), &mut state);
        let text = drawn_text(&outcome);
        assert!(
            text.starts_with(category.glyph()),
            "{} should start with {}",
            text,
            category.glyph()
        );
    }
}

#[test]
fn test_uppercase_category_from_detector() {
    let mut annotator = annotator(vec![Ok(vec![face(&[("SAD", 0.6)])])]);
    let mut state = SessionState::new();

    let (_, outcome) = annotator.annotate(frame(), &mut state);
    assert_eq!(drawn_text(&outcome), "😢 Sad (60.0%)");
}

// ============================================================================
// NO FACE / DETECTOR FAILURE
// ============================================================================

#[test]
fn test_no_face_keeps_stored_label() {
    let mut annotator = annotator(vec![Ok(vec![face(&[("happy", 0.82)])]), Ok(vec![])]);
    let mut state = SessionState::new();

    annotator.annotate(frame(), &mut state);
    let (_, outcome) = annotator.annotate(frame(), &mut state);

    assert_eq!(drawn_text(&outcome), "😐 No face detected");
    assert_eq!(annotator.current_text(), &OverlayText::NoFace);
    // The overlay says "no face" while the stored label still holds the last face.
    assert_eq!(state.last_emotion_label().as_deref(), Some("😄 Happy (82.0%)"));
}

#[test]
fn test_no_face_on_fresh_session() {
    let mut annotator = annotator(vec![Ok(vec![])]);
    let mut state = SessionState::new();

    let (_, outcome) = annotator.annotate(frame(), &mut state);
    assert_eq!(drawn_text(&outcome), "😐 No face detected");
    assert!(state.last_emotion_label().is_none());
}

#[test]
fn test_detector_failure_is_treated_as_no_face() {
    let mut annotator = annotator(vec![Err(DetectionError::Model {
        reason: "mtcnn exploded".to_string(),
    })]);
    let mut state = SessionState::new();
    state.record_emotion(EmotionLabel::new("fear", 0.3));

    let (frame, outcome) = annotator.annotate(frame(), &mut state);

    assert_eq!(
        outcome,
        FrameOutcome::Annotated {
            text: OverlayText::NoFace,
            detection_error: Some(MediaError::DetectionFailed {
                detector: "scripted".to_string(),
                reason: "Model error: mtcnn exploded".to_string(),
            }),
        }
    );
    assert_eq!(state.last_emotion().map(|l| l.name.as_str()), Some("fear"));
    assert!(frame.data.iter().any(|b| *b == 255));
}

#[test]
fn test_face_without_finite_scores_counts_as_no_face() {
    let mut annotator = annotator(vec![Ok(vec![face(&[("happy", f32::NAN)])])]);
    let mut state = SessionState::new();

    let (_, outcome) = annotator.annotate(frame(), &mut state);
    assert_eq!(drawn_text(&outcome), "😐 No face detected");
}

// ============================================================================
// TIE-BREAK POLICIES
// ============================================================================

#[test]
fn test_first_face_wins() {
    let mut annotator = annotator(vec![Ok(vec![
        face(&[("sad", 0.51)]),
        face(&[("happy", 0.99)]),
    ])]);
    let mut state = SessionState::new();

    let (_, outcome) = annotator.annotate(frame(), &mut state);
    assert_eq!(drawn_text(&outcome), "😢 Sad (51.0%)");
}

#[test]
fn test_equal_scores_keep_first_emitted_entry() {
    let mut annotator = annotator(vec![
        Ok(vec![face(&[("neutral", 0.5), ("happy", 0.5)])]),
        Ok(vec![face(&[("happy", 0.5), ("neutral", 0.5)])]),
    ]);
    let mut state = SessionState::new();

    let (_, first) = annotator.annotate(frame(), &mut state);
    let (_, second) = annotator.annotate(frame(), &mut state);

    assert_eq!(drawn_text(&first), "😐 Neutral (50.0%)");
    assert_eq!(drawn_text(&second), "😄 Happy (50.0%)");
}

// ============================================================================
// FRAME HANDLING
// ============================================================================

#[test]
fn test_annotated_frame_keeps_shape() {
    let mut annotator = annotator(vec![Ok(vec![face(&[("happy", 0.9)])])]);
    let mut state = SessionState::new();
    let input = frame().with_timing(1234, 7);

    let (output, outcome) = annotator.annotate(input.clone(), &mut state);

    assert!(outcome.is_annotated());
    assert_eq!(output.width, input.width);
    assert_eq!(output.height, input.height);
    assert_eq!(output.format, input.format);
    assert_eq!(output.data.len(), input.data.len());
    assert_eq!(output.sequence, 7);
    assert_ne!(output.data, input.data);
}

#[test]
fn test_unsupported_format_passes_through_unmodified() {
    let mut annotator = annotator(vec![Ok(vec![face(&[("happy", 0.9)])])]);
    let mut state = SessionState::new();
    let input = VideoFrame::new(4, 4, VideoPixelFormat::YUV420P, vec![16; 24]);

    let (output, outcome) = annotator.annotate(input.clone(), &mut state);

    assert!(matches!(outcome, FrameOutcome::PassedThrough { .. }));
    assert_eq!(output, input);
    assert!(state.last_emotion_label().is_none());
    // The detector is not consulted for frames that cannot be annotated.
    assert_eq!(annotator.detector().calls(), 0);
}

#[test]
fn test_truncated_buffer_passes_through_unmodified() {
    let mut annotator = annotator(vec![]);
    let mut state = SessionState::new();
    let input = VideoFrame::new(480, 360, VideoPixelFormat::RGB24, vec![0; 100]);

    let (output, outcome) = annotator.annotate(input.clone(), &mut state);

    match outcome {
        FrameOutcome::PassedThrough { reason } => {
            assert!(reason.contains("expected 518400 bytes, got 100"), "{}", reason)
        }
        other => panic!("Expected pass-through, got {:?}", other),
    }
    assert_eq!(output, input);
}

#[test]
fn test_analyze_does_not_touch_state() {
    let mut annotator = annotator(vec![Ok(vec![face(&[("angry", 0.7)])])]);

    let analysis = annotator.analyze(&frame());
    assert_eq!(analysis.label(), Some(&EmotionLabel::new("angry", 0.7)));
    assert_eq!(annotator.current_text(), &OverlayText::Waiting);
}

#[test]
fn test_annotate_with_records_only_detected_faces() {
    let mut annotator = annotator(vec![Ok(vec![face(&[("sad", 0.6)])]), Ok(vec![])]);
    let mut recorded = Vec::new();

    annotator.annotate_with(frame(), |label| recorded.push(label));
    let (_, outcome) = annotator.annotate_with(frame(), |label| recorded.push(label));

    assert_eq!(recorded, vec![EmotionLabel::new("sad", 0.6)]);
    assert_eq!(outcome.text(), Some(&OverlayText::NoFace));
}
