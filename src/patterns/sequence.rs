//! Probabilistic sequence model for one tracker.
//!
//! A [`SequenceModel`] is a discrete hidden Markov model over cluster
//! symbols: an initial state distribution, a state transition matrix, and a
//! per-state symbol emission matrix. The likelihood of an observed symbol
//! sequence is computed with the scaled forward algorithm and reported in log
//! space; the artifact also carries the decision threshold the likelihood is
//! compared against (strictly greater passes).

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current sequence artifact format version
pub const SEQUENCE_FORMAT_VERSION: &str = "1.0";

/// Tolerance for probability rows summing to one.
const DISTRIBUTION_TOLERANCE: f64 = 1e-6;

fn default_format_version() -> String {
    SEQUENCE_FORMAT_VERSION.to_string()
}

/// Trained sequence model for one tracker under one movement pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceModel {
    /// Version of the artifact format
    #[serde(default = "default_format_version")]
    pub format_version: String,
    /// P(state) at the first observation.
    pub initial: Vec<f64>,
    /// `transition[i][j]` = P(state j at t+1 | state i at t).
    pub transition: Vec<Vec<f64>>,
    /// `emission[i][s]` = P(symbol s | state i).
    pub emission: Vec<Vec<f64>>,
    /// Log-likelihood a sequence must strictly exceed to pass.
    pub threshold: f64,
}

impl SequenceModel {
    pub fn new(
        initial: Vec<f64>,
        transition: Vec<Vec<f64>>,
        emission: Vec<Vec<f64>>,
        threshold: f64,
    ) -> Self {
        Self {
            format_version: SEQUENCE_FORMAT_VERSION.to_string(),
            initial,
            transition,
            emission,
            threshold,
        }
    }

    pub fn state_count(&self) -> usize {
        self.initial.len()
    }

    /// Size of the symbol alphabet the model was trained over.
    pub fn symbol_count(&self) -> usize {
        self.emission.first().map(Vec::len).unwrap_or(0)
    }

    fn emission_probability(&self, state: usize, symbol: usize) -> f64 {
        // Symbols outside the trained alphabet have no support.
        self.emission[state].get(symbol).copied().unwrap_or(0.0)
    }

    /// Log-likelihood of an observed symbol sequence (forward algorithm).
    ///
    /// Returns `f64::NEG_INFINITY` for an empty sequence or one the model
    /// assigns zero probability, so a strict threshold comparison fails.
    pub fn log_likelihood(&self, symbols: &[usize]) -> f64 {
        let Some((&first, rest)) = symbols.split_first() else {
            return f64::NEG_INFINITY;
        };
        let states = self.state_count();

        let mut alpha: Vec<f64> = (0..states)
            .map(|state| self.initial[state] * self.emission_probability(state, first))
            .collect();
        let mut log_likelihood = 0.0;
        if !rescale(&mut alpha, &mut log_likelihood) {
            return f64::NEG_INFINITY;
        }

        for &symbol in rest {
            let mut next = vec![0.0; states];
            for (to, slot) in next.iter_mut().enumerate() {
                let mut incoming = 0.0;
                for from in 0..states {
                    incoming += alpha[from] * self.transition[from][to];
                }
                *slot = incoming * self.emission_probability(to, symbol);
            }
            if !rescale(&mut next, &mut log_likelihood) {
                return f64::NEG_INFINITY;
            }
            alpha = next;
        }
        log_likelihood
    }

    /// Check structural validity of a loaded artifact.
    pub fn validate(&self) -> crate::Result<()> {
        let states = self.state_count();
        if states == 0 {
            return Err(crate::Error::Model(
                "sequence model has no states".to_string(),
            ));
        }
        if self.transition.len() != states || self.emission.len() != states {
            return Err(crate::Error::Model(format!(
                "sequence model expects {} transition and emission rows, got {} and {}",
                states,
                self.transition.len(),
                self.emission.len()
            )));
        }
        if self.transition.iter().any(|row| row.len() != states) {
            return Err(crate::Error::Model(
                "transition matrix is not square".to_string(),
            ));
        }
        let symbols = self.symbol_count();
        if symbols == 0 || self.emission.iter().any(|row| row.len() != symbols) {
            return Err(crate::Error::Model(
                "emission rows must share one non-empty alphabet".to_string(),
            ));
        }
        check_distribution(&self.initial, "initial")?;
        for row in &self.transition {
            check_distribution(row, "transition")?;
        }
        for row in &self.emission {
            check_distribution(row, "emission")?;
        }
        if !self.threshold.is_finite() {
            return Err(crate::Error::Model(
                "threshold must be finite".to_string(),
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
        let model: SequenceModel = serde_json::from_str(&content)?;
        if model.format_version != SEQUENCE_FORMAT_VERSION {
            tracing::warn!(
                path = %path.display(),
                found = %model.format_version,
                expected = SEQUENCE_FORMAT_VERSION,
                "Sequence artifact has different format version"
            );
        }
        model.validate()?;
        Ok(model)
    }
}

/// Normalize `alpha` to sum to one, folding the scale into the running
/// log-likelihood. Returns false when the probability mass vanished.
fn rescale(alpha: &mut [f64], log_likelihood: &mut f64) -> bool {
    let scale: f64 = alpha.iter().sum();
    if scale <= 0.0 {
        return false;
    }
    for value in alpha.iter_mut() {
        *value /= scale;
    }
    *log_likelihood += scale.ln();
    true
}

fn check_distribution(row: &[f64], what: &str) -> crate::Result<()> {
    if row.iter().any(|p| !(0.0..=1.0).contains(p)) {
        return Err(crate::Error::Model(format!(
            "{} probabilities must lie in [0, 1]",
            what
        )));
    }
    let sum: f64 = row.iter().sum();
    if (sum - 1.0).abs() > DISTRIBUTION_TOLERANCE {
        return Err(crate::Error::Model(format!(
            "{} distribution sums to {}, expected 1",
            what, sum
        )));
    }
    Ok(())
}
