// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Terminal rendering of session events.

use connectias_trust::api::SessionEvent;

/// One line per event, `None` for events printed elsewhere
pub fn render_event(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::Detection(record) => {
            let marker = if record.failed { "FAIL" } else { " OK " };
            Some(format!("[{}] {}", marker, record.label))
        }
        SessionEvent::Completed(_) => None,
        other if other.is_error() => Some(format!("[ERR ] {}", other)),
        other => Some(format!("[INFO] {}", other)),
    }
}
