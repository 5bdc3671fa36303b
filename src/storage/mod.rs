//! Raw pose persistence and analysis reporting
//!
//! Thin CSV-based I/O around the engine: recording sessions append raw pose
//! rows for offline training, and recognition analysis streams per-tracker
//! likelihood rows into an append-mode report.

pub mod pose_log;
pub mod report;

pub use pose_log::{read_pose_log, read_reference, PoseLogWriter, PoseRow};
pub use report::AnalysisReport;
