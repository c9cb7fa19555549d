// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use connectias_trust::api::{
    CheckKind, CheckOutcome, DeviceInfo, OsVersion, ProviderError, SessionEvent, TrustState,
};
use connectias_trust::{
    ChannelSink, CheckRunner, MetricsPayload, MetricsPublisher, OsFreshnessPolicy, PublishError,
    SecurityCheckProvider, UnknownPlatformPolicy,
};
use mockall::mock;
use mockall::predicate::eq;
use tokio::sync::mpsc::UnboundedReceiver;

mock! {
    pub Provider {}

    #[async_trait]
    impl SecurityCheckProvider for Provider {
        async fn check(&self, kind: CheckKind) -> Result<CheckOutcome, ProviderError>;
        fn name(&self) -> &'static str;
    }
}

mock! {
    pub Publisher {}

    #[async_trait]
    impl MetricsPublisher for Publisher {
        async fn publish(&self, payload: &MetricsPayload) -> Result<usize, PublishError>;
    }
}

/// Answers after a per-check delay so completions arrive out of order
struct DelayedProvider {
    answers: HashMap<CheckKind, (u64, Result<CheckOutcome, ProviderError>)>,
}

#[async_trait]
impl SecurityCheckProvider for DelayedProvider {
    async fn check(&self, kind: CheckKind) -> Result<CheckOutcome, ProviderError> {
        match self.answers.get(&kind) {
            Some((delay_ms, answer)) => {
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                answer.clone()
            }
            None => Err(ProviderError::Unsupported(kind)),
        }
    }

    fn name(&self) -> &'static str {
        "delayed"
    }
}

fn android(version: OsVersion) -> DeviceInfo {
    DeviceInfo::new("Android", version)
}

async fn drain(mut rx: UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

fn passing_provider() -> MockProvider {
    let mut provider = MockProvider::new();
    provider.expect_name().return_const("mock");
    provider
        .expect_check()
        .times(4)
        .returning(|_| Ok(CheckOutcome::pass()));
    provider
}

#[test_log::test(tokio::test)]
async fn five_passing_checks_score_one_hundred() {
    let runner = CheckRunner::new(Arc::new(passing_provider()), android(OsVersion::new(8, 0, 0)));
    let state = runner.perform_checks().await;

    assert_eq!(state.total_tests(), 5);
    assert_eq!(state.total_failures(), 0);
    assert_eq!(state.trust_score(), Some(100.0));
}

#[test_log::test(tokio::test)]
async fn rejected_root_check_emits_error_and_records_nothing() {
    let mut provider = MockProvider::new();
    provider.expect_name().return_const("mock");
    provider
        .expect_check()
        .with(eq(CheckKind::NotRooted))
        .times(1)
        .returning(|_| Err(ProviderError::Rejected("root SDK crashed".to_string())));
    provider
        .expect_check()
        .withf(|kind| *kind != CheckKind::NotRooted)
        .times(3)
        .returning(|_| Ok(CheckOutcome::pass()));

    let (sink, rx) = ChannelSink::new();
    let runner = CheckRunner::new(Arc::new(provider), android(OsVersion::new(9, 0, 0)))
        .with_sink(Arc::new(sink));
    let state = runner.perform_checks().await;
    drop(runner);

    assert_eq!(state.total_tests(), 4);
    assert!(state
        .detections()
        .iter()
        .all(|record| record.check != Some(CheckKind::NotRooted)));

    let events = drain(rx).await;
    let errors: Vec<String> = events
        .iter()
        .filter(|event| event.is_error())
        .map(ToString::to_string)
        .collect();
    assert_eq!(errors, vec!["Error running check not_rooted: root SDK crashed"]);
    assert!(matches!(events.last(), Some(SessionEvent::Completed(s)) if *s == state));
}

#[tokio::test]
async fn outdated_android_records_failed_os_check() {
    let runner = CheckRunner::new(Arc::new(passing_provider()), android(OsVersion::new(7, 0, 0)));
    let state = runner.perform_checks().await;

    let os = state
        .detections()
        .iter()
        .find(|record| record.check == Some(CheckKind::LatestOs))
        .unwrap();
    assert!(os.failed);
    assert_eq!(os.label, "Outdated OS Version Detected");
    assert_eq!(state.trust_score(), Some(80.0));
}

#[tokio::test]
async fn unknown_platform_records_no_os_check_by_default() {
    let device = DeviceInfo::new("Windows", OsVersion::new(10, 0, 0));
    let state = CheckRunner::new(Arc::new(passing_provider()), device.clone())
        .perform_checks()
        .await;
    assert_eq!(state.total_tests(), 4);

    let strict = OsFreshnessPolicy::new(
        connectias_trust::policy::default_os_minimums(),
        UnknownPlatformPolicy::Fail,
    );
    let state = CheckRunner::new(Arc::new(passing_provider()), device)
        .with_freshness_policy(strict)
        .perform_checks()
        .await;
    assert_eq!(state.total_tests(), 5);
    assert_eq!(state.total_failures(), 1);
}

#[tokio::test]
async fn out_of_order_completions_give_same_state() {
    let answers = |delays: [u64; 4]| DelayedProvider {
        answers: HashMap::from([
            (CheckKind::NotRooted, (delays[0], Ok(CheckOutcome::fail()))),
            (CheckKind::NotEmulated, (delays[1], Ok(CheckOutcome::pass()))),
            (CheckKind::NotDebugMode, (delays[2], Ok(CheckOutcome::fail()))),
            (CheckKind::HasDeviceLock, (delays[3], Ok(CheckOutcome::pass()))),
        ]),
    };
    let device = android(OsVersion::new(12, 0, 0));

    let forward = CheckRunner::new(Arc::new(answers([5, 15, 25, 35])), device.clone())
        .perform_checks()
        .await;
    let backward = CheckRunner::new(Arc::new(answers([35, 25, 15, 5])), device)
        .perform_checks()
        .await;

    let labels = |state: &TrustState| {
        let mut labels: Vec<String> = state.detections().iter().map(|d| d.label.clone()).collect();
        labels.sort();
        labels
    };
    assert_eq!(forward.total_tests(), 5);
    assert_eq!(forward.total_failures(), backward.total_failures());
    assert_eq!(forward.trust_score(), Some(60.0));
    assert_eq!(forward.trust_score(), backward.trust_score());
    assert_eq!(labels(&forward), labels(&backward));
}

#[tokio::test]
async fn hung_check_times_out_without_blocking_others() {
    let provider = DelayedProvider {
        answers: HashMap::from([
            (CheckKind::NotRooted, (0, Ok(CheckOutcome::pass()))),
            (CheckKind::NotEmulated, (0, Ok(CheckOutcome::pass()))),
            (CheckKind::NotDebugMode, (0, Ok(CheckOutcome::pass()))),
            (CheckKind::HasDeviceLock, (60_000, Ok(CheckOutcome::pass()))),
        ]),
    };
    let (sink, rx) = ChannelSink::new();
    let runner = CheckRunner::new(Arc::new(provider), android(OsVersion::new(10, 0, 0)))
        .with_sink(Arc::new(sink))
        .with_check_timeout(Duration::from_millis(50));
    let state = runner.perform_checks().await;
    drop(runner);

    assert_eq!(state.total_tests(), 4);
    let events = drain(rx).await;
    assert!(events.iter().any(|event| matches!(
        event,
        SessionEvent::CheckFailed { check: CheckKind::HasDeviceLock, message } if message.contains("timed out")
    )));
}

#[tokio::test]
async fn cancelled_session_does_not_leak_into_the_next() {
    let provider = DelayedProvider {
        answers: HashMap::from([
            (CheckKind::NotRooted, (100, Ok(CheckOutcome::fail()))),
            (CheckKind::NotEmulated, (150, Ok(CheckOutcome::pass()))),
            (CheckKind::NotDebugMode, (150, Ok(CheckOutcome::pass()))),
            (CheckKind::HasDeviceLock, (150, Ok(CheckOutcome::pass()))),
        ]),
    };
    let runner = CheckRunner::new(Arc::new(provider), android(OsVersion::new(12, 0, 0)));

    let cancelled = tokio::time::timeout(Duration::from_millis(10), runner.perform_checks()).await;
    assert!(cancelled.is_err());

    let state = runner.perform_checks().await;
    assert_eq!(state.total_tests(), 5);
    assert_eq!(state.total_failures(), 1);
    let root_detections = state
        .detections()
        .iter()
        .filter(|record| record.label == "Root Access Detected")
        .count();
    assert_eq!(root_detections, 1);

    // Checks from the cancelled session would have finished by now
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(runner.aggregator().current_report(), state);
}

#[test_log::test(tokio::test)]
async fn metrics_are_published_after_checks() {
    let mut publisher = MockPublisher::new();
    publisher
        .expect_publish()
        .withf(|payload: &MetricsPayload| {
            payload.results.len() == 5 && payload.results.iter().all(|entry| entry.passed)
        })
        .times(1)
        .returning(|payload| Ok(payload.results.len()));

    let (sink, rx) = ChannelSink::new();
    let runner = CheckRunner::new(Arc::new(passing_provider()), android(OsVersion::new(11, 0, 0)))
        .with_sink(Arc::new(sink))
        .with_publisher(Arc::new(publisher));
    runner.perform_checks().await;
    drop(runner);

    let events = drain(rx).await;
    assert!(events.contains(&SessionEvent::MetricsSent { count: 5 }));
}

#[tokio::test]
async fn metrics_failure_leaves_state_untouched() {
    let mut publisher = MockPublisher::new();
    publisher
        .expect_publish()
        .times(1)
        .returning(|_| Err(PublishError::Status(503)));

    let (sink, rx) = ChannelSink::new();
    let runner = CheckRunner::new(Arc::new(passing_provider()), android(OsVersion::new(11, 0, 0)))
        .with_sink(Arc::new(sink))
        .with_publisher(Arc::new(publisher));
    let state = runner.perform_checks().await;
    let after = runner.aggregator().current_report();
    drop(runner);

    assert_eq!(state, after);
    assert_eq!(state.trust_score(), Some(100.0));

    let events = drain(rx).await;
    assert!(events.iter().any(|event| event.to_string()
        == "Error sending metrics: metrics collector responded with status 503"));
}
