// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Check runner - drives one trust session.
//!
//! Provider checks run as independent tokio tasks and report into the shared
//! [`TrustAggregator`] in whatever order they complete. A failing or hung
//! check never holds back the others.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use connectias_trust_api::{CheckKind, DeviceInfo, ProviderError, SessionEvent, TrustState};
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::aggregator::TrustAggregator;
use crate::config::TrustConfig;
use crate::metrics::{HttpMetricsPublisher, MetricsPayload, MetricsPublisher, PublishError};
use crate::policy::OsFreshnessPolicy;
use crate::provider::SecurityCheckProvider;
use crate::sink::{PresentationSink, TracingSink};

pub struct CheckRunner {
    provider: Arc<dyn SecurityCheckProvider>,
    device: DeviceInfo,
    freshness: OsFreshnessPolicy,
    sink: Arc<dyn PresentationSink>,
    publisher: Option<Arc<dyn MetricsPublisher>>,
    check_timeout: Option<Duration>,
    aggregator: Arc<TrustAggregator>,
}

impl CheckRunner {
    /// Runner with default thresholds, logging sink and no metrics
    pub fn new(provider: Arc<dyn SecurityCheckProvider>, device: DeviceInfo) -> Self {
        Self {
            provider,
            device,
            freshness: OsFreshnessPolicy::default(),
            sink: Arc::new(TracingSink),
            publisher: None,
            check_timeout: None,
            aggregator: Arc::new(TrustAggregator::new()),
        }
    }

    /// Runner configured from `config`, including the HTTP publisher if set
    pub fn from_config(
        provider: Arc<dyn SecurityCheckProvider>,
        device: DeviceInfo,
        config: &TrustConfig,
    ) -> Result<Self, PublishError> {
        let mut runner = Self::new(provider, device).with_freshness_policy(config.os_freshness_policy());
        runner.check_timeout = config.check_timeout();
        if let Some(metrics) = &config.metrics {
            runner.publisher = Some(Arc::new(HttpMetricsPublisher::from_config(metrics)?));
        }
        Ok(runner)
    }

    pub fn with_sink(mut self, sink: Arc<dyn PresentationSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn MetricsPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn with_freshness_policy(mut self, policy: OsFreshnessPolicy) -> Self {
        self.freshness = policy;
        self
    }

    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = Some(timeout);
        self
    }

    /// Shared aggregator, e.g. for a view polling the current report
    pub fn aggregator(&self) -> Arc<TrustAggregator> {
        Arc::clone(&self.aggregator)
    }

    /// Run a full session and return the final state
    ///
    /// Sessions on the same runner must not overlap: each one starts by
    /// resetting the shared aggregator.
    pub async fn perform_checks(&self) -> TrustState {
        let session_id = Uuid::new_v4();
        info!(%session_id, platform = %self.device.platform, provider = self.provider.name(), "starting trust session");
        self.aggregator.reset();

        // 1. OS freshness, derived from device info
        if let Some(record) = self.freshness.evaluate(&self.device) {
            let record = self.aggregator.record(record);
            self.sink.emit(SessionEvent::Detection(record));
        }

        // 2. Provider checks, concurrently. Dropping the set aborts them, so
        // a cancelled session cannot record into the next one.
        let mut tasks = JoinSet::new();
        for kind in CheckKind::PROVIDED {
            let provider = Arc::clone(&self.provider);
            let aggregator = Arc::clone(&self.aggregator);
            let sink = Arc::clone(&self.sink);
            let timeout = self.check_timeout;

            tasks.spawn(async move {
                run_check(kind, provider, aggregator, sink, timeout).await;
                kind
            });
        }

        let mut pending: BTreeSet<CheckKind> = CheckKind::PROVIDED.into_iter().collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(kind) => {
                    pending.remove(&kind);
                }
                Err(e) => error!(error = %e, "check task aborted"),
            }
        }
        for kind in pending {
            self.sink.emit(SessionEvent::CheckFailed {
                check: kind,
                message: "check task aborted".to_string(),
            });
        }

        let state = self.aggregator.current_report();

        // 3. Metrics, never touching local state
        if let Some(publisher) = &self.publisher {
            let payload = MetricsPayload::from_state(session_id, self.device.clone(), &state);
            match publisher.publish(&payload).await {
                Ok(count) => self.sink.emit(SessionEvent::MetricsSent { count }),
                Err(e) => {
                    warn!(%session_id, error = %e, "failed to publish metrics");
                    self.sink.emit(SessionEvent::MetricsFailed { message: e.to_string() });
                }
            }
        }

        info!(
            %session_id,
            total_tests = state.total_tests(),
            total_failures = state.total_failures(),
            trust_score = ?state.trust_score(),
            "trust session finished"
        );
        self.sink.emit(SessionEvent::Completed(state.clone()));
        state
    }
}

async fn run_check(
    kind: CheckKind,
    provider: Arc<dyn SecurityCheckProvider>,
    aggregator: Arc<TrustAggregator>,
    sink: Arc<dyn PresentationSink>,
    timeout: Option<Duration>,
) {
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, provider.check(kind)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::TimedOut {
                after_ms: limit.as_millis() as u64,
            }),
        },
        None => provider.check(kind).await,
    };

    match result {
        Ok(outcome) => {
            let record = aggregator.record_check(kind, outcome.failed());
            sink.emit(SessionEvent::Detection(record));
        }
        Err(e) => {
            warn!(check = %kind, provider = provider.name(), error = %e, "security check failed");
            sink.emit(SessionEvent::CheckFailed {
                check: kind,
                message: e.to_string(),
            });
        }
    }
}
