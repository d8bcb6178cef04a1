use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single probe target.
/// The `id` must be unique within one run; `metadata` is carried through to the report untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub id: String,
    pub address: String,
    pub metadata: BTreeMap<String, String>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Metadata lookup that treats a missing key as an empty string.
    pub fn meta(&self, key: &str) -> &str {
        self.metadata.get(key).map(String::as_str).unwrap_or_default()
    }
}

/// Why a single probe did not produce a latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    Timeout,
    Unreachable,
    ParseError,
    ProcessError,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureReason::Timeout => "timeout",
            FailureReason::Unreachable => "unreachable",
            FailureReason::ParseError => "unparseable probe output",
            FailureReason::ProcessError => "probe could not be started",
        };
        f.write_str(text)
    }
}

/// The result of probing one candidate. Exactly one is produced per candidate per run.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Success {
        candidate_id: String,
        latency_ms: f64,
        measured_at: DateTime<Utc>,
    },
    Failure {
        candidate_id: String,
        reason: FailureReason,
    },
}

impl ProbeOutcome {
    pub fn success(candidate_id: impl Into<String>, latency_ms: f64) -> Self {
        ProbeOutcome::Success {
            candidate_id: candidate_id.into(),
            latency_ms,
            measured_at: Utc::now(),
        }
    }

    pub fn failure(candidate_id: impl Into<String>, reason: FailureReason) -> Self {
        ProbeOutcome::Failure {
            candidate_id: candidate_id.into(),
            reason,
        }
    }

    pub fn candidate_id(&self) -> &str {
        match self {
            ProbeOutcome::Success { candidate_id, .. } => candidate_id,
            ProbeOutcome::Failure { candidate_id, .. } => candidate_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success { .. })
    }
}
