// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Presentation sinks - one-way delivery of [`SessionEvent`]s.

use connectias_trust_api::SessionEvent;
use tokio::sync::mpsc;
use tracing::{info, trace, warn};

/// Receives session events as they happen; must not block
pub trait PresentationSink: Send + Sync {
    fn emit(&self, event: SessionEvent);
}

/// Writes events to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl PresentationSink for TracingSink {
    fn emit(&self, event: SessionEvent) {
        match &event {
            SessionEvent::Detection(record) => {
                info!(label = %record.label, failed = record.failed, "detection")
            }
            SessionEvent::Completed(state) => info!(
                total_tests = state.total_tests(),
                total_failures = state.total_failures(),
                trust_score = ?state.trust_score(),
                "{}",
                state.summary()
            ),
            other if other.is_error() => warn!("{}", other),
            other => info!("{}", other),
        }
    }
}

/// Forwards events to an unbounded channel, e.g. for a UI task
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl PresentationSink for ChannelSink {
    fn emit(&self, event: SessionEvent) {
        if self.tx.send(event).is_err() {
            trace!("presentation receiver closed, dropping event");
        }
    }
}
