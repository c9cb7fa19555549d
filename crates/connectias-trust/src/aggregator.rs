// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Trust aggregator - shared, lock-protected [`TrustState`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use connectias_trust_api::{CheckKind, DetectionRecord, TrustState};
use tracing::debug;

/// Collects detections reported by concurrently running checks
///
/// Every mutation happens inside one critical section, so callers on
/// different tasks or threads never need to coordinate.
#[derive(Debug, Default)]
pub struct TrustAggregator {
    state: Mutex<TrustState>,
}

impl TrustAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic can only happen outside the critical section, the state
    // behind a poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, TrustState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a detection with a free-form label
    pub fn record_detection(&self, label: impl Into<String>, failed: bool) -> DetectionRecord {
        self.record(DetectionRecord::new(label, failed))
    }

    /// Append a detection labelled for `check`
    pub fn record_check(&self, check: CheckKind, failed: bool) -> DetectionRecord {
        self.record(DetectionRecord::for_check(check, failed))
    }

    pub fn record(&self, record: DetectionRecord) -> DetectionRecord {
        let mut state = self.lock();
        state.record(record.clone());
        debug!(
            label = %record.label,
            failed = record.failed,
            total_tests = state.total_tests(),
            trust_score = ?state.trust_score(),
            "detection recorded"
        );
        record
    }

    /// Start a new session: no detections, no score
    pub fn reset(&self) {
        self.lock().clear();
    }

    /// Snapshot of the current state
    pub fn current_report(&self) -> TrustState {
        self.lock().clone()
    }
}
