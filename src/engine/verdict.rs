//! Session verdicts and per-tracker score breakdowns.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pose::types::{TrackerSlot, TRACKER_COUNT};

/// Outcome for a single tracker slot within one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackerOutcome {
    /// The tracker produced no samples during the session.
    NoData,
    /// The tracker had samples but no trained model pair on disk.
    NoModel,
    /// The tracker was scored against a trained model pair.
    Scored {
        /// Log likelihood of the observed symbol sequence.
        likelihood: f64,
        /// Acceptance threshold from the sequence model.
        threshold: f64,
        /// Whether the likelihood strictly exceeded the threshold.
        passed: bool,
        /// Candidate index this tracker voted for, in identify mode.
        vote: Option<usize>,
    },
}

impl TrackerOutcome {
    /// True unless the tracker was scored and failed its threshold.
    ///
    /// Unscored trackers do not count against a session, so they pass
    /// vacuously.
    pub fn passed(&self) -> bool {
        match self {
            TrackerOutcome::Scored { passed, .. } => *passed,
            _ => true,
        }
    }

    pub fn is_scored(&self) -> bool {
        matches!(self, TrackerOutcome::Scored { .. })
    }
}

impl Default for TrackerOutcome {
    fn default() -> Self {
        TrackerOutcome::NoData
    }
}

/// Per-tracker breakdown for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    /// One outcome per tracker slot, indexed by [`TrackerSlot::index`].
    pub trackers: Vec<TrackerOutcome>,
}

impl Default for SessionReport {
    fn default() -> Self {
        Self::empty()
    }
}

impl SessionReport {
    /// Report with every slot marked [`TrackerOutcome::NoData`].
    pub fn empty() -> Self {
        Self {
            trackers: vec![TrackerOutcome::NoData; TRACKER_COUNT],
        }
    }

    pub fn set(&mut self, slot: TrackerSlot, outcome: TrackerOutcome) {
        self.trackers[slot.index()] = outcome;
    }

    pub fn get(&self, slot: TrackerSlot) -> &TrackerOutcome {
        &self.trackers[slot.index()]
    }

    /// Number of slots that were actually scored.
    pub fn scored_count(&self) -> usize {
        self.trackers.iter().filter(|t| t.is_scored()).count()
    }

    /// True when every scored slot passed its threshold.
    ///
    /// Vacuously true when nothing was scored.
    pub fn all_scored_passed(&self) -> bool {
        self.trackers.iter().all(|t| t.passed())
    }
}

/// Final verdict for one recognition session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionVerdict {
    /// Verify mode: every scored tracker passed its threshold.
    Accepted { report: SessionReport },
    /// Verify mode: at least one scored tracker failed its threshold.
    Rejected { report: SessionReport },
    /// Identify mode: a candidate won the vote and passed its thresholds.
    AcceptedAs { pattern: String, report: SessionReport },
    /// Identify mode: a candidate won the vote but failed its thresholds.
    RejectedAs { pattern: String, report: SessionReport },
    /// Identify mode: no candidate won a strict majority of votes.
    Unrecognized { report: SessionReport },
}

impl SessionVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(
            self,
            SessionVerdict::Accepted { .. } | SessionVerdict::AcceptedAs { .. }
        )
    }

    /// Candidate label identified by the vote, if any.
    ///
    /// Present for both [`SessionVerdict::AcceptedAs`] and
    /// [`SessionVerdict::RejectedAs`]: losing the threshold check does not
    /// erase which candidate won the vote.
    pub fn identified_pattern(&self) -> Option<&str> {
        match self {
            SessionVerdict::AcceptedAs { pattern, .. }
            | SessionVerdict::RejectedAs { pattern, .. } => Some(pattern),
            _ => None,
        }
    }

    pub fn report(&self) -> &SessionReport {
        match self {
            SessionVerdict::Accepted { report }
            | SessionVerdict::Rejected { report }
            | SessionVerdict::AcceptedAs { report, .. }
            | SessionVerdict::RejectedAs { report, .. }
            | SessionVerdict::Unrecognized { report } => report,
        }
    }
}

impl fmt::Display for SessionVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionVerdict::Accepted { .. } => write!(f, "accepted"),
            SessionVerdict::Rejected { .. } => write!(f, "rejected"),
            SessionVerdict::AcceptedAs { pattern, .. } => {
                write!(f, "accepted as {}", pattern)
            }
            SessionVerdict::RejectedAs { pattern, .. } => {
                write!(f, "rejected as {}", pattern)
            }
            SessionVerdict::Unrecognized { .. } => write!(f, "unrecognized"),
        }
    }
}
