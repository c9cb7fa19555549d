// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Security-check providers
//!
//! Every concrete detection backend is wrapped in an adapter implementing
//! [`SecurityCheckProvider`]. Adapters normalize the backend's polarity so
//! that `passed == true` always means the device satisfies the check.

use async_trait::async_trait;
use connectias_trust_api::{CheckKind, CheckOutcome, ProviderError};

pub mod fixture;
pub mod legacy;
pub mod native;

pub use fixture::{Fixture, FixtureError, FixtureOutcome, FixtureProvider};
pub use legacy::{CallbackSecurityService, ErrorCallback, LegacySdkAdapter, PinCheck, ResultCallback};
pub use native::{NativeDetector, NativeReportAdapter};

/// Asynchronous source of check outcomes
#[async_trait]
pub trait SecurityCheckProvider: Send + Sync {
    /// Run one check
    ///
    /// An `Err` means the provider could not answer; it is never recorded
    /// as a failed detection.
    async fn check(&self, kind: CheckKind) -> Result<CheckOutcome, ProviderError>;

    /// Provider identifier for logging
    fn name(&self) -> &'static str;
}
