// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Adapter for the native detector library.
//!
//! The native detectors return their results as JSON strings (the same
//! payloads handed across JNI). They scan the filesystem and /proc, so calls
//! run on the blocking pool.

use std::sync::Arc;

use async_trait::async_trait;
use connectias_trust_api::{CheckKind, CheckOutcome, ProviderError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::SecurityCheckProvider;

/// Root detection result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootDetectionResult {
    pub is_rooted: bool,
    #[serde(default)]
    pub detection_methods: Vec<String>,
}

/// Debugger detection result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebuggerDetectionResult {
    pub is_debugger_attached: bool,
    #[serde(default)]
    pub detection_methods: Vec<String>,
}

/// Emulator detection result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmulatorDetectionResult {
    pub is_emulator: bool,
    #[serde(default)]
    pub detection_method_names: Vec<String>, // Non-PII identifiers
}

/// Native detector entry points, each returning a JSON report
pub trait NativeDetector: Send + Sync {
    fn detect_root(&self) -> String;
    fn detect_debugger(&self) -> String;
    fn detect_emulator(&self) -> String;
}

/// [`SecurityCheckProvider`] over a [`NativeDetector`]
pub struct NativeReportAdapter<D> {
    detector: Arc<D>,
}

impl<D: NativeDetector + 'static> NativeReportAdapter<D> {
    pub fn new(detector: Arc<D>) -> Self {
        Self { detector }
    }

    async fn run<T, F>(&self, call: F) -> Result<T, ProviderError>
    where
        T: DeserializeOwned + Send,
        F: FnOnce(&D) -> String + Send + 'static,
    {
        let detector = Arc::clone(&self.detector);
        let json = tokio::task::spawn_blocking(move || call(&detector))
            .await
            .map_err(|e| ProviderError::Rejected(format!("native detector aborted: {}", e)))?;

        serde_json::from_str(&json).map_err(|e| ProviderError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl<D: NativeDetector + 'static> SecurityCheckProvider for NativeReportAdapter<D> {
    async fn check(&self, kind: CheckKind) -> Result<CheckOutcome, ProviderError> {
        match kind {
            CheckKind::NotRooted => {
                let result: RootDetectionResult = self.run(|d| d.detect_root()).await?;
                debug!(methods = ?result.detection_methods, "native root detection");
                Ok(CheckOutcome::from_passed(!result.is_rooted))
            }
            CheckKind::NotDebugMode => {
                let result: DebuggerDetectionResult = self.run(|d| d.detect_debugger()).await?;
                debug!(methods = ?result.detection_methods, "native debugger detection");
                Ok(CheckOutcome::from_passed(!result.is_debugger_attached))
            }
            CheckKind::NotEmulated => {
                let result: EmulatorDetectionResult = self.run(|d| d.detect_emulator()).await?;
                debug!(methods = ?result.detection_method_names, "native emulator detection");
                Ok(CheckOutcome::from_passed(!result.is_emulator))
            }
            // Device lock and OS version come from platform APIs, not from native code
            CheckKind::HasDeviceLock | CheckKind::LatestOs => Err(ProviderError::Unsupported(kind)),
        }
    }

    fn name(&self) -> &'static str {
        "native-detector"
    }
}
