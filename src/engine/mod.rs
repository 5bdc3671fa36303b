//! Recognition engine
//!
//! The core of the system: the session state machine governing record vs.
//! recognize modes, the classification pipeline over buffered tracker
//! streams, and the aggregation that turns per-tracker scores into one
//! session verdict.

pub mod session;
pub mod verdict;
pub mod pipeline;
pub mod recognizer;

pub use recognizer::{EngineConfig, RecognitionEngine};
pub use session::{SessionContext, SessionState};
pub use verdict::{SessionReport, SessionVerdict, TrackerOutcome};
