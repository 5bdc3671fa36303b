//! # Pose Patterns
//!
//! A movement-pattern recognition engine for body-worn 3D trackers. Per-frame
//! tracker poses (position + unit quaternion) are buffered during a recognition
//! session, discretized against trained cluster centroids, and scored with a
//! probabilistic sequence model per tracker; per-tracker results are then
//! aggregated into a single session verdict.
//!
//! ## Overview
//!
//! The hosting application feeds one pose per tracker per frame. While a
//! recording session is active, raw poses are appended to a CSV log for
//! offline training. While a recognition session is active, poses are
//! normalized against the session-start reference frame and buffered per
//! tracker; stopping the session runs the classification pipeline over the
//! buffered streams and returns the verdict.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pose_patterns::{Quat, RecognitionEngine, Vec3};
//!
//! let mut engine = RecognitionEngine::new();
//!
//! // The head pose at session start defines the reference frame.
//! engine.start_recognition(Vec3::new(0.0, 1.7, 0.0), Quat::identity());
//!
//! // ... one call per tracker per frame ...
//! engine.record_movement(0.016, "head", Vec3::new(0.0, 1.7, 0.05), Quat::identity())?;
//!
//! let verdict = engine.stop_recognition()?;
//! println!("accepted: {}", verdict.is_accepted());
//! # Ok::<(), pose_patterns::Error>(())
//! ```
//!
//! ## Architecture
//!
//! The system is organized into the following modules:
//!
//! - [`pose`]: Tracker slots, raw poses, and feature-vector normalization
//! - [`patterns`]: Trained cluster and sequence models and their on-disk store
//! - [`engine`]: Session state machine, classification pipeline, and verdicts
//! - [`storage`]: Raw pose CSV persistence and the analysis report stream
//! - [`app`]: CLI and configuration management
//!
//! ## Recognition Pipeline
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │  Per-frame  │───▶│  Normalize  │───▶│ Per-tracker │───▶│  Nearest    │
//! │   poses     │    │ (ref frame) │    │   buffers   │    │  centroid   │
//! └─────────────┘    └─────────────┘    └─────────────┘    └─────────────┘
//!                                                                 │
//!                                                                 ▼
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Session   │◀───│  Majority   │◀───│  Threshold  │◀───│  Sequence   │
//! │   verdict   │    │    vote     │    │   checks    │    │  likelihood │
//! └─────────────┘    └─────────────┘    └─────────────┘    └─────────────┘
//! ```

pub mod pose;
pub mod patterns;
pub mod storage;
pub mod engine;
pub mod app;

// Re-export commonly used types
pub use engine::recognizer::{EngineConfig, RecognitionEngine};
pub use engine::session::SessionState;
pub use engine::verdict::{SessionReport, SessionVerdict, TrackerOutcome};
pub use pose::types::{PoseSample, Quat, TrackerSlot, Vec3};

/// Result type alias for the recognition engine
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the recognition engine
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Session error: {0}")]
    Session(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
