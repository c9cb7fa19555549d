// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Connectias Device Trust
//!
//! Aggregates device-integrity check outcomes (root, emulator, debug mode,
//! OS freshness, device lock) into a trust score. Detection itself is done
//! by external providers; this crate normalizes their answers, records them
//! and reports the result to the presentation layer.

pub mod aggregator;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod policy;
pub mod provider;
pub mod runner;
pub mod sink;

pub use aggregator::TrustAggregator;
pub use config::{ConfigError, MetricsConfig, TrustConfig};
pub use metrics::{HttpMetricsPublisher, MetricEntry, MetricsPayload, MetricsPublisher, PublishError};
pub use policy::{OsFreshnessPolicy, UnknownPlatformPolicy};
pub use provider::SecurityCheckProvider;
pub use runner::CheckRunner;
pub use sink::{ChannelSink, PresentationSink, TracingSink};

pub use connectias_trust_api as api;
