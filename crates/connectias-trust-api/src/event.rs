// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

use std::fmt;

use serde::Serialize;

use crate::check::CheckKind;
use crate::report::{DetectionRecord, TrustState};

/// Events delivered to the presentation layer during a session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A check completed and was recorded
    Detection(DetectionRecord),
    /// A provider could not answer; nothing was recorded
    CheckFailed { check: CheckKind, message: String },
    MetricsSent { count: usize },
    MetricsFailed { message: String },
    /// All checks settled, carries the final state
    Completed(TrustState),
}

impl SessionEvent {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            SessionEvent::CheckFailed { .. } | SessionEvent::MetricsFailed { .. }
        )
    }
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::Detection(record) => f.write_str(&record.label),
            SessionEvent::CheckFailed { check, message } => {
                write!(f, "Error running check {}: {}", check, message)
            }
            SessionEvent::MetricsSent { count } => write!(f, "{} metrics sent", count),
            SessionEvent::MetricsFailed { message } => {
                write!(f, "Error sending metrics: {}", message)
            }
            SessionEvent::Completed(state) => f.write_str(&state.summary()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_texts() {
        let failed = SessionEvent::CheckFailed {
            check: CheckKind::NotRooted,
            message: "plugin missing".to_string(),
        };
        assert_eq!(failed.to_string(), "Error running check not_rooted: plugin missing");
        assert!(failed.is_error());

        let sent = SessionEvent::MetricsSent { count: 4 };
        assert_eq!(sent.to_string(), "4 metrics sent");
        assert!(!sent.is_error());

        let send_failed = SessionEvent::MetricsFailed {
            message: "timeout".to_string(),
        };
        assert_eq!(send_failed.to_string(), "Error sending metrics: timeout");
    }

    #[test]
    fn test_event_json_is_tagged() {
        let event = SessionEvent::Detection(DetectionRecord::for_check(CheckKind::NotRooted, true));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "detection");
        assert_eq!(json["label"], "Root Access Detected");
        assert_eq!(json["failed"], true);
    }
}
