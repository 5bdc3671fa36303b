//! Tracker poses and feature vectors
//!
//! This module turns raw per-frame tracker poses into the normalized
//! feature vectors the classification pipeline consumes:
//! - Fixed tracker-slot enumeration with name lookup
//! - Session-start reference frame and pose normalization
//! - Per-tracker feature buffers for one recognition session

pub mod types;
pub mod normalize;
pub mod stream;

pub use types::{FeatureVector, PoseSample, Quat, TrackerSlot, Vec3, FEATURE_DIMS, TRACKER_COUNT};
pub use normalize::SessionReference;
pub use stream::{TrackerStream, TrackerStreams};
