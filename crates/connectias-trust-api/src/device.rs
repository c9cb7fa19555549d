// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Device information injected into a trust session.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Operating system family reported by the device
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    Android,
    Ios,
    Other(String),
}

impl Platform {
    /// Name as reported by the platform plugin ("Android", "iOS", ...)
    pub fn as_str(&self) -> &str {
        match self {
            Platform::Android => "Android",
            Platform::Ios => "iOS",
            Platform::Other(name) => name,
        }
    }
}

impl From<String> for Platform {
    fn from(name: String) -> Self {
        // Plugin names are matched exactly, "android" is not "Android"
        match name.as_str() {
            "Android" => Platform::Android,
            "iOS" => Platform::Ios,
            _ => Platform::Other(name),
        }
    }
}

impl From<&str> for Platform {
    fn from(name: &str) -> Self {
        Platform::from(name.to_string())
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.as_str().to_string()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an OS version string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("empty version string")]
    Empty,
    #[error("invalid version component '{component}' in '{input}'")]
    InvalidComponent { input: String, component: String },
    #[error("too many version components in '{0}' (expected at most 3)")]
    TooManyComponents(String),
}

/// OS version compared component-wise (major, minor, patch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct OsVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl OsVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }
}

impl FromStr for OsVersion {
    type Err = VersionParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let mut parts = [0u32; 3];
        let mut count = 0;
        for component in trimmed.split('.') {
            if count == parts.len() {
                return Err(VersionParseError::TooManyComponents(input.to_string()));
            }
            parts[count] = component
                .parse::<u32>()
                .map_err(|_| VersionParseError::InvalidComponent {
                    input: input.to_string(),
                    component: component.to_string(),
                })?;
            count += 1;
        }

        Ok(OsVersion::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for OsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.patch == 0 {
            write!(f, "{}.{}", self.major, self.minor)
        } else {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
        }
    }
}

impl Serialize for OsVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Accepts "8.1", "17.4.1" as well as bare numbers such as `8` or `11.0`
impl<'de> Deserialize<'de> for OsVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OsVersionVisitor;

        impl<'de> Visitor<'de> for OsVersionVisitor {
            type Value = OsVersion;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a version string like \"8.1\" or a number")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<OsVersion, E> {
                value.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<OsVersion, E> {
                let major = u32::try_from(value).map_err(E::custom)?;
                Ok(OsVersion::new(major, 0, 0))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<OsVersion, E> {
                let major = u32::try_from(value).map_err(E::custom)?;
                Ok(OsVersion::new(major, 0, 0))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<OsVersion, E> {
                if !value.is_finite() || value < 0.0 {
                    return Err(E::custom(format!("invalid version number {}", value)));
                }
                value.to_string().parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(OsVersionVisitor)
    }
}

/// Platform and OS details of the device under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub platform: Platform,
    pub os_version: OsVersion,
    /// True when running on an emulator or simulator
    #[serde(default)]
    pub is_virtual: bool,
}

impl DeviceInfo {
    pub fn new(platform: impl Into<Platform>, os_version: OsVersion) -> Self {
        Self {
            platform: platform.into(),
            os_version,
            is_virtual: false,
        }
    }

    pub fn virtual_device(mut self, is_virtual: bool) -> Self {
        self.is_virtual = is_virtual;
        self
    }
}
