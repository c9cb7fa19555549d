// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Optional publishing of check outcomes to a remote collector.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use connectias_trust_api::{CheckKind, DeviceInfo, TrustState};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::config::MetricsConfig;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("metrics request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("metrics collector responded with status {0}")]
    Status(u16),
}

/// Outcome of one check as sent to the collector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<CheckKind>,
    pub label: String,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsPayload {
    pub session_id: Uuid,
    pub collected_at: DateTime<Utc>,
    pub device: DeviceInfo,
    pub results: Vec<MetricEntry>,
}

impl MetricsPayload {
    pub fn from_state(session_id: Uuid, device: DeviceInfo, state: &TrustState) -> Self {
        let results = state
            .detections()
            .iter()
            .map(|record| MetricEntry {
                check: record.check,
                label: record.label.clone(),
                passed: !record.failed,
            })
            .collect();

        Self {
            session_id,
            collected_at: Utc::now(),
            device,
            results,
        }
    }
}

/// Sink for session metrics; returns how many entries were accepted
#[async_trait]
pub trait MetricsPublisher: Send + Sync {
    async fn publish(&self, payload: &MetricsPayload) -> Result<usize, PublishError>;
}

/// Posts the payload as JSON to an HTTP collector
#[derive(Debug, Clone)]
pub struct HttpMetricsPublisher {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpMetricsPublisher {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &MetricsConfig) -> Result<Self, PublishError> {
        Self::new(config.endpoint.clone(), config.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MetricsPublisher for HttpMetricsPublisher {
    async fn publish(&self, payload: &MetricsPayload) -> Result<usize, PublishError> {
        let response = self.client.post(&self.endpoint).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Status(status.as_u16()));
        }

        debug!(endpoint = %self.endpoint, count = payload.results.len(), "metrics published");
        Ok(payload.results.len())
    }
}
