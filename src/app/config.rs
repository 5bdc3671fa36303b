//! Configuration Management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::engine::recognizer::EngineConfig;
use crate::pose::normalize::REFERENCE_HEIGHT;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[derive(Default)]
pub struct Config {
    /// Storage locations
    pub storage: StorageConfig,
    /// Recognition settings
    #[serde(default)]
    pub recognition: RecognitionConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for raw recordings and analysis reports
    pub data_dir: PathBuf,
    /// Root directory for trained pattern artifacts
    pub models_dir: PathBuf,
}

/// Recognition configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Pattern identifier used in artifact and recording file names
    pub pattern_name: String,
    /// Candidate subdirectories consulted in identification mode
    pub candidates: Vec<String>,
    /// Body height the session reference frame rescales to (meters)
    pub reference_height: f64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            data_dir: home.join(".pose_patterns").join("data"),
            models_dir: home.join(".pose_patterns").join("models"),
        }
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
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

impl Config {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.recognition.pattern_name.trim().is_empty() {
            return Err(crate::Error::Config(
                "pattern_name must not be empty".to_string(),
            ));
        }
        if self.recognition.pattern_name.contains(['/', '\\']) {
            return Err(crate::Error::Config(format!(
                "pattern_name must not contain path separators, got {:?}",
                self.recognition.pattern_name
            )));
        }
        if self.recognition.candidates.is_empty() {
            return Err(crate::Error::Config(
                "candidates must name at least one pattern".to_string(),
            ));
        }
        for candidate in &self.recognition.candidates {
            if candidate.trim().is_empty() || candidate.contains(['/', '\\']) {
                return Err(crate::Error::Config(format!(
                    "candidate name must be a plain directory name, got {:?}",
                    candidate
                )));
            }
        }
        if !self.recognition.reference_height.is_finite() || self.recognition.reference_height <= 0.0
        {
            return Err(crate::Error::Config(format!(
                "reference_height must be positive, got {}",
                self.recognition.reference_height
            )));
        }
        Ok(())
    }

    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default location
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<(), crate::Error> {
        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;

        // Create parent directories
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save to default location
    pub fn save_default(&self) -> Result<(), crate::Error> {
        self.save(&Self::default_path())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".pose_patterns").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Engine settings derived from this config
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            data_dir: self.storage.data_dir.clone(),
            models_dir: self.storage.models_dir.clone(),
            pattern_name: self.recognition.pattern_name.clone(),
            candidates: self.recognition.candidates.clone(),
            reference_height: self.recognition.reference_height,
        }
    }
}
