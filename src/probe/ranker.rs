use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::error::DispatchError;
use super::prelude::*;

/// One successfully probed candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub candidate: Candidate,
    pub latency_ms: f64,
}

/// The outcome of one dispatcher run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Successes, ascending by latency, ties by candidate id.
    pub ranked: Vec<RankedEntry>,
    /// Failures keyed by candidate id.
    pub failed: BTreeMap<String, FailureReason>,
    pub total: usize,
    pub succeeded: usize,
}

impl RunReport {
    pub fn best(&self) -> Option<&RankedEntry> {
        self.ranked.first()
    }

    /// The `k` entries ranked directly after the best one.
    pub fn next(&self, k: usize) -> &[RankedEntry] {
        let end = self.ranked.len().min(k.saturating_add(1));
        self.ranked.get(1..end).unwrap_or_default()
    }

    pub fn is_all_failed(&self) -> bool {
        self.succeeded == 0
    }

    /// Turns a report without a single success into [`DispatchError::AllFailed`].
    pub fn into_result(self) -> Result<RunReport, DispatchError> {
        if self.is_all_failed() {
            Err(DispatchError::AllFailed(Box::new(self)))
        } else {
            Ok(self)
        }
    }

    /// `(id, latency)` pairs in rank order.
    pub fn ranking(&self) -> Vec<(&str, f64)> {
        self.ranked
            .iter()
            .map(|entry| (entry.candidate.id.as_str(), entry.latency_ms))
            .collect()
    }
}

fn compare_entries(a: &RankedEntry, b: &RankedEntry) -> Ordering {
    a.latency_ms
        .total_cmp(&b.latency_ms)
        .then_with(|| a.candidate.id.cmp(&b.candidate.id))
}

/// Partitions outcomes into a ranked success list and a failure map.
///
/// The result depends only on the set of outcomes, never on their order.
/// A success carrying a negative or non-finite latency is recorded as a
/// `ParseError` failure. Outcomes for ids missing from `candidates_by_id`
/// are dropped.
pub fn rank(outcomes: &[ProbeOutcome], candidates_by_id: &HashMap<String, Candidate>) -> RunReport {
    let mut ranked = Vec::new();
    let mut failed = BTreeMap::new();

    for outcome in outcomes {
        let Some(candidate) = candidates_by_id.get(outcome.candidate_id()) else {
            log::warn!("dropping outcome for unknown candidate {}", outcome.candidate_id());
            continue;
        };

        match outcome {
            ProbeOutcome::Success { latency_ms, .. } if latency_ms.is_finite() && *latency_ms >= 0.0 => {
                ranked.push(RankedEntry {
                    candidate: candidate.clone(),
                    latency_ms: *latency_ms,
                })
            }
            ProbeOutcome::Success { latency_ms, .. } => {
                log::debug!("[{}] discarding invalid latency {latency_ms}", candidate.id);
                failed.insert(candidate.id.clone(), FailureReason::ParseError);
            }
            ProbeOutcome::Failure { reason, .. } => {
                failed.insert(candidate.id.clone(), *reason);
            }
        }
    }

    ranked.sort_by(compare_entries);
    let succeeded = ranked.len();

    RunReport {
        total: succeeded + failed.len(),
        succeeded,
        ranked,
        failed,
    }
}
