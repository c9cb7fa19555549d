// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! TOML configuration for trust sessions.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use connectias_trust_api::OsVersion;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::{default_os_minimums, OsFreshnessPolicy, UnknownPlatformPolicy};

const DEFAULT_METRICS_TIMEOUT_MS: u64 = 3000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Remote collector settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    pub endpoint: String,
    #[serde(default = "default_metrics_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_metrics_timeout_ms() -> u64 {
    DEFAULT_METRICS_TIMEOUT_MS
}

impl MetricsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrustConfig {
    /// Per-check limit; unset means checks may take as long as they need
    pub check_timeout_ms: Option<u64>,
    pub unknown_platform: UnknownPlatformPolicy,
    /// Minimum OS version per platform name
    pub os_minimums: BTreeMap<String, OsVersion>,
    pub metrics: Option<MetricsConfig>,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            check_timeout_ms: None,
            unknown_platform: UnknownPlatformPolicy::default(),
            os_minimums: default_os_minimums(),
            metrics: None,
        }
    }
}

impl TrustConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: TrustConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.check_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "check_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if let Some(metrics) = &self.metrics {
            if metrics.endpoint.trim().is_empty() {
                return Err(ConfigError::Invalid("metrics.endpoint is empty".to_string()));
            }
            if metrics.timeout_ms == 0 {
                return Err(ConfigError::Invalid(
                    "metrics.timeout_ms must be greater than zero".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn check_timeout(&self) -> Option<Duration> {
        self.check_timeout_ms.map(Duration::from_millis)
    }

    pub fn os_freshness_policy(&self) -> OsFreshnessPolicy {
        OsFreshnessPolicy::new(self.os_minimums.clone(), self.unknown_platform)
    }
}
