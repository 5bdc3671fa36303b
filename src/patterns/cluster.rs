//! Cluster centroids for one tracker.
//!
//! A [`ClusterModel`] discretizes a buffered feature stream into a symbol
//! sequence: each vector is first aligned to the training data's reference
//! frame, then assigned the index of its nearest centroid. Assignment is
//! deterministic; re-running it on the same input yields the same symbols.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::pose::types::{FeatureVector, FEATURE_DIMS};

/// Current centroid artifact format version
pub const CLUSTER_FORMAT_VERSION: &str = "1.0";

fn default_format_version() -> String {
    CLUSTER_FORMAT_VERSION.to_string()
}

/// Trained cluster centroids for one tracker under one movement pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterModel {
    /// Version of the artifact format
    #[serde(default = "default_format_version")]
    pub format_version: String,
    /// Centroid feature vectors, one per cluster, in symbol order.
    pub centroids: Vec<[f64; FEATURE_DIMS]>,
    /// Mean of the training set; observations are aligned to it before
    /// assignment.
    pub training_mean: [f64; FEATURE_DIMS],
}

impl ClusterModel {
    pub fn new(centroids: Vec<[f64; FEATURE_DIMS]>, training_mean: [f64; FEATURE_DIMS]) -> Self {
        Self {
            format_version: CLUSTER_FORMAT_VERSION.to_string(),
            centroids,
            training_mean,
        }
    }

    /// Number of clusters, which is also the symbol alphabet size.
    pub fn cluster_count(&self) -> usize {
        self.centroids.len()
    }

    /// Translate features so their mean coincides with the training mean.
    ///
    /// Returns the aligned raw vectors in input order. The buffer's own mean
    /// is computed over all of its vectors, so alignment is a pure function
    /// of the whole buffer.
    pub fn align_to_training(&self, features: &[FeatureVector]) -> Vec<[f64; FEATURE_DIMS]> {
        if features.is_empty() {
            return Vec::new();
        }
        let mut mean = [0.0; FEATURE_DIMS];
        for feature in features {
            for (dim, value) in feature.values.iter().enumerate() {
                mean[dim] += value;
            }
        }
        let count = features.len() as f64;
        let mut offset = [0.0; FEATURE_DIMS];
        for dim in 0..FEATURE_DIMS {
            offset[dim] = self.training_mean[dim] - mean[dim] / count;
        }
        features
            .iter()
            .map(|feature| {
                let mut aligned = feature.values;
                for dim in 0..FEATURE_DIMS {
                    aligned[dim] += offset[dim];
                }
                aligned
            })
            .collect()
    }

    /// Index of the nearest centroid by Euclidean distance.
    ///
    /// Ties go to the lowest index.
    pub fn nearest_centroid(&self, values: &[f64; FEATURE_DIMS]) -> usize {
        let mut best_index = 0;
        let mut best_distance = f64::INFINITY;
        for (index, centroid) in self.centroids.iter().enumerate() {
            let distance = distance_squared(values, centroid);
            if distance < best_distance {
                best_distance = distance;
                best_index = index;
            }
        }
        best_index
    }

    /// Discretize a buffered stream into its symbol sequence.
    pub fn assign_symbols(&self, features: &[FeatureVector]) -> Vec<usize> {
        self.align_to_training(features)
            .iter()
            .map(|values| self.nearest_centroid(values))
            .collect()
    }

    /// Check structural validity of a loaded artifact.
    pub fn validate(&self) -> crate::Result<()> {
        if self.centroids.is_empty() {
            return Err(crate::Error::Model(
                "cluster model has no centroids".to_string(),
            ));
        }
        Ok(())
    }

    /// Save the artifact as pretty JSON.
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load an artifact, warning on an unknown format version.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let model: ClusterModel = serde_json::from_str(&content)?;
        if model.format_version != CLUSTER_FORMAT_VERSION {
            tracing::warn!(
                path = %path.display(),
                found = %model.format_version,
                expected = CLUSTER_FORMAT_VERSION,
                "Cluster artifact has different format version"
            );
        }
        model.validate()?;
        Ok(model)
    }
}

fn distance_squared(a: &[f64; FEATURE_DIMS], b: &[f64; FEATURE_DIMS]) -> f64 {
    let mut sum = 0.0;
    for dim in 0..FEATURE_DIMS {
        let diff = a[dim] - b[dim];
        sum += diff * diff;
    }
    sum
}
