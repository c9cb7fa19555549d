// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Detection records and the cumulative trust state of a session.

use serde::{Deserialize, Serialize};

use crate::check::CheckKind;

/// One recorded check outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<CheckKind>,
    pub label: String,
    /// True when the check failed, i.e. a risk is present
    pub failed: bool,
}

impl DetectionRecord {
    pub fn new(label: impl Into<String>, failed: bool) -> Self {
        Self {
            check: None,
            label: label.into(),
            failed,
        }
    }

    /// Record labelled with the standard text for `check`
    pub fn for_check(check: CheckKind, failed: bool) -> Self {
        Self {
            check: Some(check),
            label: check.label(failed).to_string(),
            failed,
        }
    }
}

/// Cumulative result of a trust session
///
/// Counters are only changed through [`TrustState::record`], which keeps
/// `total_tests == detections.len()` and recomputes the score from scratch.
/// Deserializing replays the detections and ignores any serialized counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecordedDetections")]
pub struct TrustState {
    detections: Vec<DetectionRecord>,
    total_tests: usize,
    total_failures: usize,
    /// `None` until at least one check has been recorded
    trust_score: Option<f64>,
}

#[derive(Deserialize)]
struct RecordedDetections {
    #[serde(default)]
    detections: Vec<DetectionRecord>,
}

impl From<RecordedDetections> for TrustState {
    fn from(recorded: RecordedDetections) -> Self {
        let mut state = TrustState::new();
        for record in recorded.detections {
            state.record(record);
        }
        state
    }
}

impl TrustState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: DetectionRecord) {
        self.total_tests += 1;
        if record.failed {
            self.total_failures += 1;
        }
        self.detections.push(record);
        self.trust_score = Self::score(self.total_failures, self.total_tests);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// 100 minus the failure rate, undefined for zero tests
    pub fn score(failures: usize, tests: usize) -> Option<f64> {
        if tests == 0 {
            return None;
        }
        Some(100.0 - ((failures as f64 / tests as f64) * 100.0))
    }

    pub fn detections(&self) -> &[DetectionRecord] {
        &self.detections
    }

    pub fn total_tests(&self) -> usize {
        self.total_tests
    }

    pub fn total_failures(&self) -> usize {
        self.total_failures
    }

    pub fn trust_score(&self) -> Option<f64> {
        self.trust_score
    }

    pub fn is_empty(&self) -> bool {
        self.total_tests == 0
    }

    /// One-line summary for display, never renders NaN
    pub fn summary(&self) -> String {
        match self.trust_score {
            None => "No checks run yet".to_string(),
            Some(score) => format!(
                "Trust score: {:.1}% ({} of {} checks failed)",
                score, self.total_failures, self.total_tests
            ),
        }
    }
}
