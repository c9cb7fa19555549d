// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Security checks that make up a trust session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    NotRooted,
    NotEmulated,
    NotDebugMode,
    HasDeviceLock,
    /// Derived from device info, never asked of a provider
    LatestOs,
}

impl CheckKind {
    /// Checks answered by an external security-check provider
    pub const PROVIDED: [CheckKind; 4] = [
        CheckKind::NotRooted,
        CheckKind::NotEmulated,
        CheckKind::NotDebugMode,
        CheckKind::HasDeviceLock,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CheckKind::NotRooted => "not_rooted",
            CheckKind::NotEmulated => "not_emulated",
            CheckKind::NotDebugMode => "not_debug_mode",
            CheckKind::HasDeviceLock => "has_device_lock",
            CheckKind::LatestOs => "latest_os",
        }
    }

    /// Human-readable detection label for an outcome of this check
    pub fn label(self, failed: bool) -> &'static str {
        match (self, failed) {
            (CheckKind::NotRooted, true) => "Root Access Detected",
            (CheckKind::NotRooted, false) => "Root Access Not Detected",
            (CheckKind::NotEmulated, true) => "Emulator Access Detected",
            (CheckKind::NotEmulated, false) => "Emulator Access Not Detected",
            (CheckKind::NotDebugMode, true) => "Debug Access Detected",
            (CheckKind::NotDebugMode, false) => "Debug Access Not Detected",
            (CheckKind::HasDeviceLock, true) => "Device Lock Not Enabled",
            (CheckKind::HasDeviceLock, false) => "Device Lock Enabled",
            (CheckKind::LatestOs, true) => "Outdated OS Version Detected",
            (CheckKind::LatestOs, false) => "Latest OS Version Detected",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider answer for a single check
///
/// `passed == true` means the device satisfies the condition named by the
/// [`CheckKind`] (not rooted, has a lock, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub passed: bool,
}

impl CheckOutcome {
    pub const fn pass() -> Self {
        Self { passed: true }
    }

    pub const fn fail() -> Self {
        Self { passed: false }
    }

    pub const fn from_passed(passed: bool) -> Self {
        Self { passed }
    }

    /// Normalized polarity used by the aggregator: true = risk present
    pub const fn failed(self) -> bool {
        !self.passed
    }
}

/// Failure of a provider to answer a check
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("{0}")]
    Rejected(String),
    #[error("check {0} is not supported by this provider")]
    Unsupported(CheckKind),
    #[error("malformed provider response: {0}")]
    Malformed(String),
    #[error("provider dropped the check without reporting")]
    Dropped,
    #[error("check timed out after {after_ms}ms")]
    TimedOut { after_ms: u64 },
}
