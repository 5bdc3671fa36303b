//! Locating and loading trained pattern artifacts.
//!
//! Artifacts live under a models directory. A tracker's pair of files is
//! named from the pattern name and the stable slot index:
//!
//! ```text
//! <models_dir>/<pattern>_<slot>.centroids.json
//! <models_dir>/<pattern>_<slot>.sequence.json
//! ```
//!
//! In identify mode each candidate pattern is a subdirectory of the models
//! directory holding the same file layout. A missing file is an ordinary
//! data condition (the tracker trains without it), so loads return
//! `Ok(None)` rather than an error; only unreadable or malformed files are
//! errors.

use std::path::{Path, PathBuf};

use crate::patterns::cluster::ClusterModel;
use crate::patterns::sequence::SequenceModel;
use crate::pose::types::TrackerSlot;

/// The trained model pair for one tracker under one pattern.
#[derive(Debug, Clone)]
pub struct TrackerModels {
    pub clusters: ClusterModel,
    pub sequence: SequenceModel,
}

/// Resolves and loads pattern artifacts from disk.
#[derive(Debug, Clone)]
pub struct PatternStore {
    models_dir: PathBuf,
    pattern_name: String,
}

impl PatternStore {
    pub fn new(models_dir: impl Into<PathBuf>, pattern_name: impl Into<String>) -> Self {
        Self {
            models_dir: models_dir.into(),
            pattern_name: pattern_name.into(),
        }
    }

    pub fn pattern_name(&self) -> &str {
        &self.pattern_name
    }

    /// Directory holding the verify-mode artifacts.
    pub fn base_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Directory holding one identify-mode candidate's artifacts.
    pub fn candidate_dir(&self, candidate: &str) -> PathBuf {
        self.models_dir.join(candidate)
    }

    fn artifact_stem(&self, slot: TrackerSlot) -> String {
        format!("{}_{}", self.pattern_name, slot.index())
    }

    pub fn centroid_path(&self, dir: &Path, slot: TrackerSlot) -> PathBuf {
        dir.join(format!("{}.centroids.json", self.artifact_stem(slot)))
    }

    pub fn sequence_path(&self, dir: &Path, slot: TrackerSlot) -> PathBuf {
        dir.join(format!("{}.sequence.json", self.artifact_stem(slot)))
    }

    /// Load one tracker's model pair from `dir`.
    ///
    /// `Ok(None)` when either file does not exist; `Err` when a file exists
    /// but cannot be read or parsed.
    pub fn load_slot(&self, dir: &Path, slot: TrackerSlot) -> crate::Result<Option<TrackerModels>> {
        let centroid_path = self.centroid_path(dir, slot);
        let sequence_path = self.sequence_path(dir, slot);
        if !centroid_path.exists() || !sequence_path.exists() {
            return Ok(None);
        }
        let clusters = ClusterModel::load(&centroid_path)?;
        let sequence = SequenceModel::load(&sequence_path)?;
        Ok(Some(TrackerModels { clusters, sequence }))
    }
}
