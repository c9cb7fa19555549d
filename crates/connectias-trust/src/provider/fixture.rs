// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Static provider backed by a JSON fixture.
//!
//! ```json
//! {
//!   "device": { "platform": "Android", "os_version": "7.1", "is_virtual": true },
//!   "checks": {
//!     "not_rooted": true,
//!     "not_debug_mode": { "error": "IsDebug plugin not installed" }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use connectias_trust_api::{CheckKind, CheckOutcome, DeviceInfo, ProviderError};
use serde::Deserialize;
use thiserror::Error;

use super::SecurityCheckProvider;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid fixture: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Fixture answer for one check
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FixtureOutcome {
    Passed(bool),
    Rejected { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Fixture {
    pub device: DeviceInfo,
    #[serde(default)]
    pub checks: BTreeMap<CheckKind, FixtureOutcome>,
}

/// Answers checks from a [`Fixture`]; absent checks are unsupported
#[derive(Debug, Clone)]
pub struct FixtureProvider {
    fixture: Fixture,
}

impl FixtureProvider {
    pub fn new(fixture: Fixture) -> Self {
        Self { fixture }
    }

    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn device(&self) -> &DeviceInfo {
        &self.fixture.device
    }
}

#[async_trait]
impl SecurityCheckProvider for FixtureProvider {
    async fn check(&self, kind: CheckKind) -> Result<CheckOutcome, ProviderError> {
        match self.fixture.checks.get(&kind) {
            Some(FixtureOutcome::Passed(passed)) => Ok(CheckOutcome::from_passed(*passed)),
            Some(FixtureOutcome::Rejected { error }) => Err(ProviderError::Rejected(error.clone())),
            None => Err(ProviderError::Unsupported(kind)),
        }
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
