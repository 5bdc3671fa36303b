//! Verification and identification scoring over buffered tracker streams.
//!
//! Both pipelines share one scoring core: a tracker's feature buffer is
//! aligned to the cluster model's training mean, mapped to its nearest
//! centroid symbols, and scored by the sequence model's forward algorithm.
//! Verification checks every scorable tracker against a single candidate's
//! thresholds. Identification lets each tracker vote for its best-scoring
//! candidate and only then applies the winner's thresholds.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::engine::verdict::{SessionReport, SessionVerdict, TrackerOutcome};
use crate::patterns::store::{PatternStore, TrackerModels};
use crate::pose::stream::{TrackerStream, TrackerStreams};
use crate::pose::types::{TrackerSlot, TRACKER_COUNT};

/// Trained models for one candidate pattern, one slot per tracker.
pub struct CandidateModels {
    /// Label reported in verdicts and analysis rows.
    pub label: String,
    /// Model pair per tracker slot, `None` where files are absent.
    pub models: [Option<TrackerModels>; TRACKER_COUNT],
}

impl CandidateModels {
    pub fn get(&self, slot: TrackerSlot) -> Option<&TrackerModels> {
        self.models[slot.index()].as_ref()
    }

    /// Number of slots with a trained model pair.
    pub fn trained_count(&self) -> usize {
        self.models.iter().filter(|m| m.is_some()).count()
    }
}

/// Load one candidate's models from a directory.
///
/// A slot with missing or unreadable files is left empty with a warning.
/// The tracker is excluded from scoring rather than failing the session.
pub fn load_candidate(store: &PatternStore, dir: &Path, label: &str) -> CandidateModels {
    let mut models: [Option<TrackerModels>; TRACKER_COUNT] =
        std::array::from_fn(|_| None);

    for slot in TrackerSlot::ALL {
        match store.load_slot(dir, slot) {
            Ok(Some(pair)) => {
                debug!(
                    "loaded models for tracker {} of candidate {}",
                    slot.name(),
                    label
                );
                models[slot.index()] = Some(pair);
            }
            Ok(None) => {
                warn!(
                    "no trained models for tracker {} of candidate {}, excluding from scoring",
                    slot.name(),
                    label
                );
            }
            Err(e) => {
                warn!(
                    "unreadable models for tracker {} of candidate {}, excluding from scoring: {}",
                    slot.name(),
                    label,
                    e
                );
            }
        }
    }

    CandidateModels {
        label: label.to_string(),
        models,
    }
}

/// One analysis line: a tracker scored against one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub candidate: String,
    pub slot: TrackerSlot,
    pub likelihood: f64,
    pub threshold: f64,
    pub passed: bool,
}

/// Score one tracker's buffer against one model pair.
fn score_stream(models: &TrackerModels, stream: &TrackerStream) -> (f64, f64, bool) {
    let symbols = models.clusters.assign_symbols(stream.samples());
    let likelihood = models.sequence.log_likelihood(&symbols);
    let threshold = models.sequence.threshold;
    (likelihood, threshold, likelihood > threshold)
}

/// Check every scorable tracker against a single candidate's thresholds.
///
/// A tracker is scored when it buffered samples and the candidate has its
/// model pair. The session is accepted when every scored tracker strictly
/// exceeds its threshold, vacuously so when nothing was scorable.
pub fn verify(
    candidate: &CandidateModels,
    streams: &TrackerStreams,
) -> (SessionVerdict, Vec<ReportRow>) {
    let mut report = SessionReport::empty();
    let mut rows = Vec::new();

    for slot in TrackerSlot::ALL {
        let stream = streams.get(slot);
        if stream.is_empty() {
            debug!("tracker {} buffered no samples, skipping", slot.name());
            continue;
        }
        let Some(models) = candidate.get(slot) else {
            report.set(slot, TrackerOutcome::NoModel);
            continue;
        };

        let (likelihood, threshold, passed) = score_stream(models, stream);
        info!(
            "tracker {}: {} samples, log likelihood {:.4} vs threshold {:.4} -> {}",
            slot.name(),
            stream.len(),
            likelihood,
            threshold,
            if passed { "pass" } else { "fail" }
        );
        report.set(
            slot,
            TrackerOutcome::Scored {
                likelihood,
                threshold,
                passed,
                vote: None,
            },
        );
        rows.push(ReportRow {
            candidate: candidate.label.clone(),
            slot,
            likelihood,
            threshold,
            passed,
        });
    }

    let verdict = if report.all_scored_passed() {
        SessionVerdict::Accepted { report }
    } else {
        SessionVerdict::Rejected { report }
    };
    (verdict, rows)
}

/// Per-slot scores against every candidate, for slots that participate.
struct SlotScores {
    slot: TrackerSlot,
    /// `(likelihood, threshold, passed)` per candidate, in candidate order.
    scores: Vec<(f64, f64, bool)>,
    /// Candidate index with the highest likelihood, lowest index on ties.
    vote: usize,
}

/// Pick the winning candidate among several by per-tracker vote.
///
/// A tracker participates only when it buffered samples and every candidate
/// has its model pair, so all votes compare the same candidate set. The
/// winner must hold strictly more votes than every other candidate; a tied
/// or empty vote yields [`SessionVerdict::Unrecognized`]. The winner's own
/// thresholds then decide between accepted and rejected.
pub fn identify(
    candidates: &[CandidateModels],
    streams: &TrackerStreams,
) -> (SessionVerdict, Vec<ReportRow>) {
    if candidates.is_empty() {
        warn!("no candidate patterns to identify against");
        return (
            SessionVerdict::Unrecognized {
                report: SessionReport::empty(),
            },
            Vec::new(),
        );
    }

    let mut report = SessionReport::empty();
    let mut rows = Vec::new();
    let mut participating = Vec::new();

    for slot in TrackerSlot::ALL {
        let stream = streams.get(slot);
        if stream.is_empty() {
            debug!("tracker {} buffered no samples, skipping", slot.name());
            continue;
        }
        // A tracker may only vote when every candidate can score it.
        let slot_models: Vec<_> = candidates.iter().filter_map(|c| c.get(slot)).collect();
        if slot_models.len() != candidates.len() {
            warn!(
                "tracker {} lacks models for some candidate, excluding from vote",
                slot.name()
            );
            report.set(slot, TrackerOutcome::NoModel);
            continue;
        }

        let mut scores = Vec::with_capacity(candidates.len());
        for (candidate, models) in candidates.iter().zip(slot_models.iter().copied()) {
            let (likelihood, threshold, passed) = score_stream(models, stream);
            info!(
                "tracker {} vs {}: log likelihood {:.4} vs threshold {:.4}",
                slot.name(),
                candidate.label,
                likelihood,
                threshold
            );
            rows.push(ReportRow {
                candidate: candidate.label.clone(),
                slot,
                likelihood,
                threshold,
                passed,
            });
            scores.push((likelihood, threshold, passed));
        }

        let mut vote = 0;
        for (index, score) in scores.iter().enumerate() {
            if score.0 > scores[vote].0 {
                vote = index;
            }
        }
        info!(
            "tracker {} votes for {}",
            slot.name(),
            candidates[vote].label
        );
        participating.push(SlotScores { slot, scores, vote });
    }

    let mut counts = vec![0usize; candidates.len()];
    for slot_scores in &participating {
        counts[slot_scores.vote] += 1;
    }

    let winner = unique_leader(&counts);
    let Some(winner) = winner else {
        info!("vote inconclusive, counts {:?}", counts);
        for slot_scores in &participating {
            let (likelihood, threshold, passed) = slot_scores.scores[slot_scores.vote];
            report.set(
                slot_scores.slot,
                TrackerOutcome::Scored {
                    likelihood,
                    threshold,
                    passed,
                    vote: Some(slot_scores.vote),
                },
            );
        }
        return (SessionVerdict::Unrecognized { report }, rows);
    };

    let label = candidates[winner].label.clone();
    info!(
        "candidate {} wins with {} of {} votes",
        label,
        counts[winner],
        participating.len()
    );

    for slot_scores in &participating {
        let (likelihood, threshold, passed) = slot_scores.scores[winner];
        report.set(
            slot_scores.slot,
            TrackerOutcome::Scored {
                likelihood,
                threshold,
                passed,
                vote: Some(slot_scores.vote),
            },
        );
    }

    let verdict = if report.all_scored_passed() {
        SessionVerdict::AcceptedAs {
            pattern: label,
            report,
        }
    } else {
        SessionVerdict::RejectedAs {
            pattern: label,
            report,
        }
    };
    (verdict, rows)
}

/// Index holding strictly more votes than every other, if one exists.
fn unique_leader(counts: &[usize]) -> Option<usize> {
    let mut leader = None;
    let mut best = 0;
    for (index, &count) in counts.iter().enumerate() {
        if count > best {
            best = count;
            leader = Some(index);
        } else if count == best {
            leader = None;
        }
    }
    leader
}
