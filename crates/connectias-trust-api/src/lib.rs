// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Connectias Device Trust - shared types
//!
//! Data model exchanged between check providers, the trust aggregator and
//! the presentation layer: device information, check kinds and outcomes,
//! detection records, the trust state and session events.

pub mod check;
pub mod device;
pub mod event;
pub mod report;

pub use check::{CheckKind, CheckOutcome, ProviderError};
pub use device::{DeviceInfo, OsVersion, Platform, VersionParseError};
pub use event::SessionEvent;
pub use report::{DetectionRecord, TrustState};
