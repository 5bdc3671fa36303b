//! Pose Patterns - Movement Pattern Recognition Engine
//!
//! Recognizes full-body movement patterns from recorded 3D tracker sessions.

use pose_patterns::app::cli::{Cli, Commands, ConfigAction};
use pose_patterns::app::config::Config;
use pose_patterns::engine::recognizer::RecognitionEngine;
use pose_patterns::engine::verdict::{SessionReport, TrackerOutcome};
use pose_patterns::patterns::store::PatternStore;
use pose_patterns::pose::types::{Quat, TrackerSlot, Vec3};
use pose_patterns::storage::pose_log::{read_pose_log, read_reference, reference_path_for};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    // Initialize tracing (--verbose enables debug-level output)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Load config
    let config = if let Some(path) = &cli.config {
        Config::load(path)?
    } else {
        Config::load_default()?
    };

    // Execute command
    match cli.command {
        Commands::Replay {
            file,
            identify,
            reference,
        } => {
            run_replay(&file, identify, reference, &config)?;
        }
        Commands::Models => {
            run_models(&config)?;
        }
        Commands::List { detailed } => {
            run_list(detailed, &config)?;
        }
        Commands::Init { force } => {
            run_init(force, &config)?;
        }
        Commands::Config { action } => {
            run_config(action, &config)?;
        }
    }

    Ok(())
}

fn run_replay(
    file: &std::path::Path,
    identify: bool,
    reference: Option<std::path::PathBuf>,
    config: &Config,
) -> anyhow::Result<()> {
    info!("Replaying {:?}", file);

    if !file.exists() {
        anyhow::bail!("Recorded session file not found: {:?}", file);
    }

    let rows = read_pose_log(file)?;
    info!("Loaded {} rows from {:?}", rows.len(), file);

    // Resolve the session-start reference pose: explicit flag, then the
    // recording's companion file, then the first recorded head row.
    let reference_path = reference.unwrap_or_else(|| reference_path_for(file));
    let (start_position, start_rotation) = if reference_path.exists() {
        read_reference(&reference_path)?
    } else if let Some(row) = rows.iter().find(|r| r.tracker == TrackerSlot::Head.name()) {
        warn!("No reference pose file, using the first head row");
        (row.position, row.rotation)
    } else {
        warn!("No reference pose available, assuming an upright start");
        (
            Vec3::new(0.0, config.recognition.reference_height, 0.0),
            Quat::identity(),
        )
    };

    let mut engine = RecognitionEngine::with_config(config.engine_config());
    engine.start_recognition(start_position, start_rotation);
    for row in &rows {
        engine.record_movement(row.time, &row.tracker, row.position, row.rotation)?;
    }
    let verdict = if identify {
        engine.stop_recognition_and_identify()?
    } else {
        engine.stop_recognition()?
    };

    // Print summary
    println!("\nSession Replay Complete");
    println!("  File: {}", file.display());
    println!("  Samples: {}", rows.len());
    println!("  Verdict: {}", verdict);
    print_breakdown(verdict.report());
    println!("  Report: {}", engine.report_path().display());

    Ok(())
}

fn print_breakdown(report: &SessionReport) {
    for slot in TrackerSlot::ALL {
        match report.get(slot) {
            TrackerOutcome::NoData => {}
            TrackerOutcome::NoModel => {
                println!("    {:<6} no trained models", slot.name());
            }
            TrackerOutcome::Scored {
                likelihood,
                threshold,
                passed,
                ..
            } => {
                println!(
                    "    {:<6} log likelihood {:.4} vs threshold {:.4} ({})",
                    slot.name(),
                    likelihood,
                    threshold,
                    if *passed { "pass" } else { "fail" }
                );
            }
        }
    }
}

fn run_models(config: &Config) -> anyhow::Result<()> {
    let engine_config = config.engine_config();
    let store = PatternStore::new(
        engine_config.models_dir.clone(),
        engine_config.pattern_name.clone(),
    );

    println!("Models under {:?}:", engine_config.models_dir);

    print_pattern_models(
        &store,
        store.base_dir().to_path_buf(),
        &engine_config.pattern_name,
    );
    for candidate in &engine_config.candidates {
        let dir = store.candidate_dir(candidate);
        print_pattern_models(&store, dir, candidate);
    }

    Ok(())
}

fn print_pattern_models(store: &PatternStore, dir: std::path::PathBuf, label: &str) {
    let mut trained = Vec::new();
    let mut missing = Vec::new();

    for slot in TrackerSlot::ALL {
        match store.load_slot(&dir, slot) {
            Ok(Some(_)) => trained.push(slot.name()),
            Ok(None) => missing.push(slot.name()),
            Err(e) => {
                warn!("Unreadable models for {} in {:?}: {}", slot.name(), dir, e);
                missing.push(slot.name());
            }
        }
    }

    println!("  {}:", label);
    if trained.is_empty() {
        println!("    (no trained trackers)");
    } else {
        println!("    trained: {}", trained.join(", "));
    }
    if !missing.is_empty() {
        println!("    missing: {}", missing.join(", "));
    }
}

fn run_list(detailed: bool, config: &Config) -> anyhow::Result<()> {
    let data_dir = &config.storage.data_dir;

    if !data_dir.exists() {
        println!("No recordings found in {}", data_dir.display());
        println!("Run 'pose-patterns init' to create the directories");
        return Ok(());
    }

    println!("Recordings in {:?}:", data_dir);

    let mut entries: Vec<_> = std::fs::read_dir(data_dir)?
        .filter_map(|e| e.ok())
        .filter(|e| is_recording_file(&e.path()))
        .collect();

    entries.sort_by_key(|e| e.path());

    for entry in &entries {
        let path = entry.path();
        let file_name = path.file_name().unwrap_or_default().to_string_lossy();

        if detailed {
            match read_pose_log(&path) {
                Ok(rows) => {
                    let duration = match (rows.first(), rows.last()) {
                        (Some(first), Some(last)) => last.time - first.time,
                        _ => 0.0,
                    };
                    println!("  {}  ({} rows, {:.1}s)", file_name, rows.len(), duration);
                }
                Err(_) => {
                    let fs_meta = entry.metadata()?;
                    println!("  {}  ({} bytes, failed to parse)", file_name, fs_meta.len());
                }
            }
        } else {
            println!("  {}", file_name);
        }
    }

    if entries.is_empty() {
        println!("  (none)");
    }

    Ok(())
}

/// Recorded session files, excluding reference companions and reports.
fn is_recording_file(path: &std::path::Path) -> bool {
    if path.extension().map(|ext| ext != "csv").unwrap_or(true) {
        return false;
    }
    let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
        return false;
    };
    !stem.ends_with("_ref") && !stem.starts_with("analysis_")
}

fn run_init(force: bool, config: &Config) -> anyhow::Result<()> {
    let config_path = Config::default_path();

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {:?}. Use --force to overwrite.",
            config_path
        );
    }

    config.save_default()?;
    println!("Created config at {:?}", config_path);
    println!("\nConfig content:\n{}", config.to_toml()?);

    // Create directories
    std::fs::create_dir_all(&config.storage.data_dir)?;
    std::fs::create_dir_all(&config.storage.models_dir)?;

    println!("\nCreated directories:");
    println!("  Data: {:?}", config.storage.data_dir);
    println!("  Models: {:?}", config.storage.models_dir);

    Ok(())
}

fn run_config(action: ConfigAction, config: &Config) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = config.to_toml()?;
            println!("Configuration ({:?}):\n", Config::default_path());
            println!("{}", toml_str);
        }
        ConfigAction::Path => {
            println!("{}", Config::default_path().display());
        }
        ConfigAction::Reset { force } => {
            let config_path = Config::default_path();

            if config_path.exists() && !force {
                println!("Config exists at {:?}", config_path);
                println!("Use --force to reset to defaults");
                return Ok(());
            }

            let default_config = Config::default();
            default_config.save_default()?;
            println!("Configuration reset to defaults at {:?}", config_path);
        }
    }

    Ok(())
}
