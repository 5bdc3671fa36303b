//! The recognition engine: session lifecycle, sample ingest, and verdicts.
//!
//! [`RecognitionEngine`] is the single entry point for hosting applications.
//! It owns the session state machine, routes per-frame tracker samples to
//! either the raw recording log or the recognition buffers, and runs the
//! classification pipeline when a recognition session stops.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::engine::pipeline::{self, CandidateModels, ReportRow};
use crate::engine::session::{SessionContext, SessionState};
use crate::engine::verdict::{SessionReport, SessionVerdict};
use crate::patterns::store::PatternStore;
use crate::pose::normalize::{SessionReference, REFERENCE_HEIGHT};
use crate::pose::stream::TrackerStreams;
use crate::pose::types::{PoseSample, Quat, TrackerSlot, Vec3};
use crate::storage::pose_log::{reference_path_for, PoseLogWriter};
use crate::storage::report::AnalysisReport;

/// Engine settings, usually derived from the application config.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory for raw session recordings and analysis reports.
    pub data_dir: PathBuf,
    /// Root directory holding trained pattern artifacts.
    pub models_dir: PathBuf,
    /// Pattern identifier used in artifact and recording file names.
    pub pattern_name: String,
    /// Candidate subdirectories consulted in identification mode.
    pub candidates: Vec<String>,
    /// Body height the session reference frame rescales to.
    pub reference_height: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            data_dir: home.join(".pose_patterns").join("data"),
            models_dir: home.join(".pose_patterns").join("models"),
            pattern_name: "movement".to_string(),
            candidates: vec![
                "Movement0".to_string(),
                "Movement1".to_string(),
                "Movement2".to_string(),
            ],
            reference_height: REFERENCE_HEIGHT,
        }
    }
}

/// Movement-pattern recognition engine.
///
/// The engine is always in exactly one [`SessionState`]. Starting a session
/// while another is active is a warned no-op, so callers never need to
/// sequence their UI around the engine's state.
pub struct RecognitionEngine {
    config: EngineConfig,
    state: SessionState,
    streams: TrackerStreams,
    context: Option<SessionContext>,
    store: PatternStore,
    pose_log: Option<PoseLogWriter>,
    report: AnalysisReport,
}

impl RecognitionEngine {
    /// Engine with default directories under the user's home.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let store = PatternStore::new(config.models_dir.clone(), config.pattern_name.clone());
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let report_name = format!("analysis_{}_{}.csv", config.pattern_name, stamp);
        let report = AnalysisReport::new(config.data_dir.join(report_name));
        Self {
            config,
            state: SessionState::default(),
            streams: TrackerStreams::new(),
            context: None,
            store,
            pose_log: None,
            report,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Path of the analysis report this engine streams results to.
    ///
    /// The file is created on first use, so it may not exist yet.
    pub fn report_path(&self) -> &Path {
        self.report.path()
    }

    /// Samples buffered across all trackers in the current session.
    pub fn buffered_samples(&self) -> usize {
        self.streams.total_samples()
    }

    /// Begin a raw recording session referenced to the given head pose.
    ///
    /// A warned no-op while another session is active. The recording file
    /// number continues from the highest existing recording for this
    /// pattern in the data directory.
    pub fn start_recording(
        &mut self,
        head_position: Vec3,
        head_rotation: Quat,
    ) -> crate::Result<()> {
        if !self.state.is_idle() {
            warn!("cannot start recording while {}", self.state.name());
            return Ok(());
        }
        fs::create_dir_all(&self.config.data_dir)?;
        let number = self.next_recording_number()?;
        let data_path = self
            .config
            .data_dir
            .join(format!("{}_{}.csv", self.config.pattern_name, number));
        let reference_path = reference_path_for(&data_path);
        info!(
            "recording session {} for pattern {} to {}",
            number,
            self.config.pattern_name,
            data_path.display()
        );
        self.pose_log = Some(PoseLogWriter::new(
            data_path,
            reference_path,
            head_position,
            head_rotation,
        ));
        self.state = SessionState::Recording;
        Ok(())
    }

    /// Finish the active recording session.
    ///
    /// A warned no-op when no recording is active. A session that never
    /// received a row leaves no file behind.
    pub fn stop_recording(&mut self) -> crate::Result<()> {
        if !self.state.is_recording() {
            warn!("cannot stop recording while {}", self.state.name());
            return Ok(());
        }
        self.state = SessionState::Idle;
        if let Some(writer) = self.pose_log.take() {
            let path = writer.data_path().to_path_buf();
            let rows = writer.finish()?;
            if rows == 0 {
                info!("recording ended with no samples, nothing written");
            } else {
                info!("recorded {} rows to {}", rows, path.display());
            }
        }
        Ok(())
    }

    /// Begin a recognition session referenced to the given head pose.
    ///
    /// Clears any previously buffered samples. A warned no-op while another
    /// session is active.
    pub fn start_recognition(&mut self, head_position: Vec3, head_rotation: Quat) {
        if !self.state.is_idle() {
            warn!("cannot start recognition while {}", self.state.name());
            return;
        }
        self.streams.clear_all();
        let reference =
            SessionReference::capture(head_position, head_rotation, self.config.reference_height);
        self.context = Some(SessionContext::new(reference));
        self.state = SessionState::Recognizing;
        info!(
            "recognition session started for pattern {}",
            self.config.pattern_name
        );
    }

    /// Ingest one tracker sample.
    ///
    /// While recording, the sample is appended raw to the session log under
    /// the given tracker name. While recognizing, it is normalized into the
    /// session reference frame and buffered; names outside the fixed slot
    /// table are dropped. Samples arriving while idle are ignored.
    pub fn record_movement(
        &mut self,
        time: f64,
        tracker_name: &str,
        position: Vec3,
        rotation: Quat,
    ) -> crate::Result<()> {
        match self.state {
            SessionState::Idle => Ok(()),
            SessionState::Recording => {
                if let Some(writer) = self.pose_log.as_mut() {
                    writer.record(tracker_name, time, position, rotation)?;
                }
                Ok(())
            }
            SessionState::Recognizing => {
                let Some(slot) = TrackerSlot::from_name(tracker_name) else {
                    warn!("unknown tracker name {:?}, dropping sample", tracker_name);
                    return Ok(());
                };
                // The state machine guarantees a context while recognizing
                if let Some(context) = self.context.as_mut() {
                    let index = context.next_sample_index();
                    let sample = PoseSample {
                        time,
                        position,
                        rotation,
                    };
                    let feature = context.reference.normalize(&sample, index);
                    self.streams.get_mut(slot).push(feature);
                }
                Ok(())
            }
        }
    }

    /// End the recognition session and verify it against the trained pattern.
    ///
    /// Models are loaded fresh from disk on every call. Stopping without an
    /// active recognition session rejects with an empty breakdown and writes
    /// nothing.
    pub fn stop_recognition(&mut self) -> crate::Result<SessionVerdict> {
        if !self.state.is_recognizing() {
            warn!("cannot stop recognition while {}", self.state.name());
            return Ok(SessionVerdict::Rejected {
                report: SessionReport::empty(),
            });
        }
        self.state = SessionState::Idle;
        self.context = None;

        let candidate = pipeline::load_candidate(
            &self.store,
            self.store.base_dir(),
            self.store.pattern_name(),
        );
        let (verdict, rows) = pipeline::verify(&candidate, &self.streams);
        self.write_report(&rows)?;
        info!("session verdict: {}", verdict);
        Ok(verdict)
    }

    /// End the recognition session and identify it among the candidates.
    ///
    /// Scores the buffered streams against every configured candidate
    /// pattern and lets the trackers vote. Stopping without an active
    /// recognition session rejects with an empty breakdown and writes
    /// nothing.
    pub fn stop_recognition_and_identify(&mut self) -> crate::Result<SessionVerdict> {
        if !self.state.is_recognizing() {
            warn!("cannot stop recognition while {}", self.state.name());
            return Ok(SessionVerdict::Rejected {
                report: SessionReport::empty(),
            });
        }
        self.state = SessionState::Idle;
        self.context = None;

        let candidates: Vec<CandidateModels> = self
            .config
            .candidates
            .iter()
            .map(|label| {
                let dir = self.store.candidate_dir(label);
                pipeline::load_candidate(&self.store, &dir, label)
            })
            .collect();
        let (verdict, rows) = pipeline::identify(&candidates, &self.streams);
        self.write_report(&rows)?;
        info!("session verdict: {}", verdict);
        Ok(verdict)
    }

    /// Stream scored rows to the analysis report and terminate the run.
    fn write_report(&mut self, rows: &[ReportRow]) -> crate::Result<()> {
        for row in rows {
            self.report.record(
                &row.candidate,
                row.slot.name(),
                row.likelihood,
                row.threshold,
                row.passed,
            )?;
        }
        self.report.finish_run()
    }

    /// Next free recording number for this pattern in the data directory.
    fn next_recording_number(&self) -> crate::Result<u32> {
        let prefix = format!("{}_", self.config.pattern_name);
        let mut next = 0;
        for entry in fs::read_dir(&self.config.data_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(rest) = name.strip_prefix(&prefix) else {
                continue;
            };
            let Some(stem) = rest.strip_suffix(".csv") else {
                continue;
            };
            if let Ok(number) = stem.parse::<u32>() {
                next = next.max(number + 1);
            }
        }
        Ok(next)
    }
}

impl Default for RecognitionEngine {
    fn default() -> Self {
        Self::new()
    }
}
