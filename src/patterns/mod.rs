//! Trained pattern models
//!
//! A trained movement pattern is, per tracker, a pair of artifacts loaded
//! from disk: cluster centroids that discretize motion into symbols, and a
//! probabilistic sequence model that scores symbol sequences. Training
//! happens in external tooling; this module covers loading and scoring.

pub mod cluster;
pub mod sequence;
pub mod store;

pub use cluster::ClusterModel;
pub use sequence::SequenceModel;
pub use store::{PatternStore, TrackerModels};
