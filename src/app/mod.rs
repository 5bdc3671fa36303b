//! Application Layer
//!
//! CLI surface and configuration for the pose-patterns binary.

pub mod cli;
pub mod config;

pub use cli::Cli;
pub use config::Config;
