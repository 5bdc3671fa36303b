//! Identify Session Integration Tests
//!
//! End-to-end tests for identification among candidate patterns that:
//! - Drive full sessions against per-candidate models on disk
//! - Cover unanimous, majority, split, and empty votes
//! - Verify the winner's thresholds still gate acceptance
//!
//! Fixtures use a shared three-centroid cluster model (x = -5, 0, +5 around
//! a zero training mean) and one single-state sequence model per candidate,
//! each weighting a different symbol. Mean alignment cancels every constant
//! feature dimension, so a buffer's symbols depend only on how its x values
//! swing around their own mean:
//! - `LOW_SWING` yields symbols `[0, 2, 0]` and favours Movement0
//! - `STILL` yields symbols `[1, 1, 1]` and favours Movement1
//! - `HIGH_SWING` yields symbols `[2, 0, 2]` and favours Movement2

use std::fs;
use std::path::Path;

use pose_patterns::engine::recognizer::{EngineConfig, RecognitionEngine};
use pose_patterns::engine::verdict::{SessionVerdict, TrackerOutcome};
use pose_patterns::patterns::cluster::ClusterModel;
use pose_patterns::patterns::sequence::SequenceModel;
use pose_patterns::patterns::store::PatternStore;
use pose_patterns::pose::normalize::REFERENCE_HEIGHT;
use pose_patterns::pose::types::{Quat, TrackerSlot, Vec3, FEATURE_DIMS};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

const LOW_SWING: [f64; 3] = [-5.0, 5.0, -5.0];
const STILL: [f64; 3] = [-0.5, 0.5, -0.5];
const HIGH_SWING: [f64; 3] = [5.0, -5.0, 5.0];

const PASSING_THRESHOLD: f64 = -10.0;

fn make_engine(root: &Path) -> RecognitionEngine {
    RecognitionEngine::with_config(EngineConfig {
        data_dir: root.join("data"),
        models_dir: root.join("models"),
        pattern_name: "movement".to_string(),
        candidates: vec![
            "Movement0".to_string(),
            "Movement1".to_string(),
            "Movement2".to_string(),
        ],
        reference_height: REFERENCE_HEIGHT,
    })
}

fn make_store(root: &Path) -> PatternStore {
    PatternStore::new(root.join("models"), "movement")
}

/// Cluster model with centroids at x = -5, 0, +5 and a zero training mean.
fn tri_cluster() -> ClusterModel {
    let mut low = [0.0; FEATURE_DIMS];
    low[0] = -5.0;
    let mut high = [0.0; FEATURE_DIMS];
    high[0] = 5.0;
    ClusterModel::new(vec![low, [0.0; FEATURE_DIMS], high], [0.0; FEATURE_DIMS])
}

/// Single-state sequence model emitting the favoured symbol with 0.8.
fn favouring_sequence(favoured: usize, threshold: f64) -> SequenceModel {
    let mut emission = vec![0.1; 3];
    emission[favoured] = 0.8;
    SequenceModel::new(vec![1.0], vec![vec![1.0]], vec![emission], threshold)
}

/// Write one candidate's models for the given slots.
fn write_candidate_slots(
    store: &PatternStore,
    label: &str,
    favoured: usize,
    threshold: f64,
    slots: &[TrackerSlot],
) {
    let dir = store.candidate_dir(label);
    fs::create_dir_all(&dir).unwrap();
    for &slot in slots {
        tri_cluster().save(&store.centroid_path(&dir, slot)).unwrap();
        favouring_sequence(favoured, threshold)
            .save(&store.sequence_path(&dir, slot))
            .unwrap();
    }
}

/// Write one candidate's models for every tracker slot.
fn write_candidate(store: &PatternStore, label: &str, favoured: usize, threshold: f64) {
    write_candidate_slots(store, label, favoured, threshold, &TrackerSlot::ALL);
}

/// Three candidates, each favouring its own symbol, all sharing a threshold.
fn write_all_candidates(store: &PatternStore, threshold: f64) {
    write_candidate(store, "Movement0", 0, threshold);
    write_candidate(store, "Movement1", 1, threshold);
    write_candidate(store, "Movement2", 2, threshold);
}

/// Head pose that makes normalization the identity on positions.
fn upright_head() -> (Vec3, Quat) {
    (Vec3::new(0.0, REFERENCE_HEIGHT, 0.0), Quat::identity())
}

/// Feed one tracker a buffer of x positions around a constant pose.
fn feed_swing(engine: &mut RecognitionEngine, name: &str, xs: &[f64]) {
    for (frame, &x) in xs.iter().enumerate() {
        engine
            .record_movement(
                frame as f64 * 0.016,
                name,
                Vec3::new(x, 1.0, 0.0),
                Quat::identity(),
            )
            .unwrap();
    }
}

// ============================================================================
// Test 1: Unanimous Vote
// ============================================================================

#[test]
fn test_unanimous_vote_accepts_winner() {
    let root = TempDir::new().unwrap();
    let store = make_store(root.path());
    write_all_candidates(&store, PASSING_THRESHOLD);

    let mut engine = make_engine(root.path());
    let (position, rotation) = upright_head();
    engine.start_recognition(position, rotation);
    for slot in TrackerSlot::ALL {
        feed_swing(&mut engine, slot.name(), &LOW_SWING);
    }

    let verdict = engine.stop_recognition_and_identify().unwrap();

    assert!(verdict.is_accepted());
    assert_eq!(verdict.identified_pattern(), Some("Movement0"));
    for slot in TrackerSlot::ALL {
        match verdict.report().get(slot) {
            TrackerOutcome::Scored { likelihood, vote, .. } => {
                assert_eq!(*vote, Some(0));
                // Movement0 emits [0, 2, 0] with 0.8 * 0.1 * 0.8.
                assert!((likelihood - 0.064f64.ln()).abs() < 1e-9);
            }
            other => panic!("expected tracker {} scored, got {:?}", slot.name(), other),
        }
    }

    // Every participating tracker is scored against every candidate.
    let report = fs::read_to_string(engine.report_path()).unwrap();
    for label in ["Movement0", "Movement1", "Movement2"] {
        let rows = report
            .lines()
            .filter(|l| l.starts_with(&format!("{};", label)))
            .count();
        assert_eq!(rows, 6, "expected six rows for {}", label);
    }
    assert_eq!(report.lines().last(), Some("end"));
}

// ============================================================================
// Test 2: Majority Vote
// ============================================================================

#[test]
fn test_majority_vote_elects_winner() {
    let root = TempDir::new().unwrap();
    let store = make_store(root.path());
    write_all_candidates(&store, PASSING_THRESHOLD);

    let mut engine = make_engine(root.path());
    let (position, rotation) = upright_head();
    engine.start_recognition(position, rotation);
    // Votes 3 / 2 / 1 for Movement0 / Movement1 / Movement2.
    feed_swing(&mut engine, "head", &LOW_SWING);
    feed_swing(&mut engine, "lHand", &LOW_SWING);
    feed_swing(&mut engine, "rHand", &LOW_SWING);
    feed_swing(&mut engine, "hip", &STILL);
    feed_swing(&mut engine, "lFoot", &STILL);
    feed_swing(&mut engine, "rFoot", &HIGH_SWING);

    let verdict = engine.stop_recognition_and_identify().unwrap();

    assert!(matches!(verdict, SessionVerdict::AcceptedAs { .. }));
    assert_eq!(verdict.identified_pattern(), Some("Movement0"));

    // Outvoted trackers keep their own vote but are reported at the
    // winner's score: Movement0 emits [2, 0, 2] with 0.1 * 0.8 * 0.1.
    match verdict.report().get(TrackerSlot::RightFoot) {
        TrackerOutcome::Scored { likelihood, vote, passed, .. } => {
            assert_eq!(*vote, Some(2));
            assert!((likelihood - 0.008f64.ln()).abs() < 1e-9);
            assert!(*passed);
        }
        other => panic!("expected right foot scored, got {:?}", other),
    }
}

// ============================================================================
// Test 3: Split Vote
// ============================================================================

#[test]
fn test_split_vote_is_unrecognized() {
    let root = TempDir::new().unwrap();
    let store = make_store(root.path());
    write_all_candidates(&store, PASSING_THRESHOLD);

    let mut engine = make_engine(root.path());
    let (position, rotation) = upright_head();
    engine.start_recognition(position, rotation);
    // Two votes apiece.
    feed_swing(&mut engine, "head", &LOW_SWING);
    feed_swing(&mut engine, "lHand", &LOW_SWING);
    feed_swing(&mut engine, "hip", &STILL);
    feed_swing(&mut engine, "lFoot", &STILL);
    feed_swing(&mut engine, "rHand", &HIGH_SWING);
    feed_swing(&mut engine, "rFoot", &HIGH_SWING);

    let verdict = engine.stop_recognition_and_identify().unwrap();

    assert!(matches!(verdict, SessionVerdict::Unrecognized { .. }));
    assert_eq!(verdict.identified_pattern(), None);

    // Each tracker is reported at its own voted candidate's score.
    match verdict.report().get(TrackerSlot::Hip) {
        TrackerOutcome::Scored { likelihood, vote, .. } => {
            assert_eq!(*vote, Some(1));
            // Movement1 emits [1, 1, 1] with 0.8^3.
            assert!((likelihood - 0.512f64.ln()).abs() < 1e-9);
        }
        other => panic!("expected hip scored, got {:?}", other),
    }
}

// ============================================================================
// Test 4: Winner Failing Thresholds
// ============================================================================

#[test]
fn test_winner_failing_thresholds_is_rejected_as() {
    let root = TempDir::new().unwrap();
    let store = make_store(root.path());
    // Movement0 still wins every vote, but its 0.0 threshold is never
    // strictly exceeded by a negative log likelihood.
    write_candidate(&store, "Movement0", 0, 0.0);
    write_candidate(&store, "Movement1", 1, PASSING_THRESHOLD);
    write_candidate(&store, "Movement2", 2, PASSING_THRESHOLD);

    let mut engine = make_engine(root.path());
    let (position, rotation) = upright_head();
    engine.start_recognition(position, rotation);
    for slot in TrackerSlot::ALL {
        feed_swing(&mut engine, slot.name(), &LOW_SWING);
    }

    let verdict = engine.stop_recognition_and_identify().unwrap();

    assert!(matches!(verdict, SessionVerdict::RejectedAs { .. }));
    assert!(!verdict.is_accepted());
    assert_eq!(verdict.identified_pattern(), Some("Movement0"));
}

// ============================================================================
// Test 5: Empty Session
// ============================================================================

#[test]
fn test_empty_session_is_unrecognized() {
    let root = TempDir::new().unwrap();
    let store = make_store(root.path());
    write_all_candidates(&store, PASSING_THRESHOLD);

    let mut engine = make_engine(root.path());
    let (position, rotation) = upright_head();
    engine.start_recognition(position, rotation);

    let verdict = engine.stop_recognition_and_identify().unwrap();

    assert!(matches!(verdict, SessionVerdict::Unrecognized { .. }));
    assert_eq!(verdict.report().scored_count(), 0);

    // The run is still terminated in the report stream.
    let report = fs::read_to_string(engine.report_path()).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(
        lines,
        vec!["pattern;tracker;likelihood;threshold;passed", "end"]
    );
}

// ============================================================================
// Test 6: Slot Missing Models For One Candidate
// ============================================================================

#[test]
fn test_slot_missing_any_candidate_models_is_excluded() {
    let root = TempDir::new().unwrap();
    let store = make_store(root.path());
    write_candidate(&store, "Movement0", 0, PASSING_THRESHOLD);
    write_candidate(&store, "Movement1", 1, PASSING_THRESHOLD);
    // Movement2 was never trained on the head tracker.
    let without_head: Vec<TrackerSlot> = TrackerSlot::ALL
        .into_iter()
        .filter(|slot| *slot != TrackerSlot::Head)
        .collect();
    write_candidate_slots(&store, "Movement2", 2, PASSING_THRESHOLD, &without_head);

    let mut engine = make_engine(root.path());
    let (position, rotation) = upright_head();
    engine.start_recognition(position, rotation);
    feed_swing(&mut engine, "head", &LOW_SWING);
    feed_swing(&mut engine, "lHand", &LOW_SWING);

    let verdict = engine.stop_recognition_and_identify().unwrap();

    // The head cannot vote; the left hand alone elects Movement0.
    assert_eq!(verdict.identified_pattern(), Some("Movement0"));
    assert_eq!(
        *verdict.report().get(TrackerSlot::Head),
        TrackerOutcome::NoModel
    );
    assert_eq!(verdict.report().scored_count(), 1);
}
