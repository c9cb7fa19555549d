// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! OS freshness check - compares the device OS version against a
//! configured minimum per platform.

use std::collections::BTreeMap;

use connectias_trust_api::{CheckKind, DetectionRecord, DeviceInfo, OsVersion};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Label recorded for unconfigured platforms under [`UnknownPlatformPolicy::Fail`]
pub const UNKNOWN_PLATFORM_LABEL: &str = "Unknown Platform Detected";

/// What to do when the device platform has no configured minimum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownPlatformPolicy {
    /// Record nothing for the OS check
    #[default]
    Ignore,
    /// Record a failed detection
    Fail,
}

/// Minimum OS versions keyed by platform name ("Android", "iOS", ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsFreshnessPolicy {
    minimums: BTreeMap<String, OsVersion>,
    unknown_platform: UnknownPlatformPolicy,
}

impl Default for OsFreshnessPolicy {
    fn default() -> Self {
        Self::new(default_os_minimums(), UnknownPlatformPolicy::default())
    }
}

/// Android 8.0 and iOS 11.0
pub fn default_os_minimums() -> BTreeMap<String, OsVersion> {
    BTreeMap::from([
        ("Android".to_string(), OsVersion::new(8, 0, 0)),
        ("iOS".to_string(), OsVersion::new(11, 0, 0)),
    ])
}

impl OsFreshnessPolicy {
    pub fn new(minimums: BTreeMap<String, OsVersion>, unknown_platform: UnknownPlatformPolicy) -> Self {
        Self {
            minimums,
            unknown_platform,
        }
    }

    pub fn minimum_for(&self, platform: &str) -> Option<OsVersion> {
        self.minimums.get(platform).copied()
    }

    /// Evaluate the device, `None` when nothing should be recorded
    pub fn evaluate(&self, device: &DeviceInfo) -> Option<DetectionRecord> {
        let platform = device.platform.as_str();
        match self.minimum_for(platform) {
            Some(minimum) => {
                let outdated = device.os_version < minimum;
                debug!(
                    platform,
                    version = %device.os_version,
                    minimum = %minimum,
                    outdated,
                    "evaluated OS freshness"
                );
                Some(DetectionRecord::for_check(CheckKind::LatestOs, outdated))
            }
            None => match self.unknown_platform {
                UnknownPlatformPolicy::Ignore => {
                    debug!(platform, "no minimum OS version configured, skipping check");
                    None
                }
                UnknownPlatformPolicy::Fail => Some(DetectionRecord {
                    check: Some(CheckKind::LatestOs),
                    label: UNKNOWN_PLATFORM_LABEL.to_string(),
                    failed: true,
                }),
            },
        }
    }
}
