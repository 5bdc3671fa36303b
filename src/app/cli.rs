//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pose Patterns - Recognize full-body movement patterns from tracker logs
#[derive(Parser, Debug)]
#[command(name = "pose-patterns")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a recorded session file through the recognition pipeline
    Replay {
        /// Recorded session CSV
        file: PathBuf,

        /// Identify among the candidate patterns instead of verifying
        #[arg(short, long)]
        identify: bool,

        /// Reference pose file (defaults to the recording's _ref companion)
        #[arg(short, long)]
        reference: Option<PathBuf>,
    },

    /// Report which trackers have trained models on disk
    Models,

    /// List recorded session files
    List {
        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,
    },

    /// Initialize directories and configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the config file path
    Path,

    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
