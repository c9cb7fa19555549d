// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Adapter for the callback-style security SDK and the pin-check plugin.
//!
//! The SDK reports "risk present" (`true` = rooted / debuggable) through a
//! success callback, the pin-check plugin rejects when no lock is set.
//! Both are bridged onto async and flipped to "passed" polarity here.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use connectias_trust_api::{CheckKind, CheckOutcome, DeviceInfo, ProviderError};
use tokio::sync::oneshot;
use tracing::debug;

use super::SecurityCheckProvider;

/// Success callback, receives `true` when the risk was detected
pub type ResultCallback = Box<dyn FnOnce(bool) + Send + 'static>;
/// Error callback, receives the SDK's error message
pub type ErrorCallback = Box<dyn FnOnce(String) + Send + 'static>;

/// Callback-style security SDK
///
/// Implementations call exactly one of the two callbacks, from any thread.
pub trait CallbackSecurityService: Send + Sync {
    fn is_rooted(&self, on_result: ResultCallback, on_error: ErrorCallback);
    fn is_debug(&self, on_result: ResultCallback, on_error: ErrorCallback);
}

/// Pin-check plugin: resolves when a device lock is set up, rejects otherwise
#[async_trait]
pub trait PinCheck: Send + Sync {
    async fn is_pin_setup(&self) -> Result<(), String>;
}

/// [`SecurityCheckProvider`] over the legacy SDK, pin-check and device info
pub struct LegacySdkAdapter<S, P> {
    service: Arc<S>,
    pin_check: Arc<P>,
    device: DeviceInfo,
}

impl<S, P> LegacySdkAdapter<S, P>
where
    S: CallbackSecurityService,
    P: PinCheck,
{
    pub fn new(service: Arc<S>, pin_check: Arc<P>, device: DeviceInfo) -> Self {
        Self {
            service,
            pin_check,
            device,
        }
    }
}

/// Turn a callback pair into a future; the first callback to fire wins
async fn bridge<F>(register: F) -> Result<bool, ProviderError>
where
    F: FnOnce(ResultCallback, ErrorCallback),
{
    let (tx, rx) = oneshot::channel::<Result<bool, String>>();
    let slot = Arc::new(Mutex::new(Some(tx)));
    let error_slot = Arc::clone(&slot);

    register(
        Box::new(move |detected: bool| {
            if let Some(tx) = slot.lock().unwrap_or_else(PoisonError::into_inner).take() {
                let _ = tx.send(Ok(detected));
            }
        }),
        Box::new(move |message: String| {
            if let Some(tx) = error_slot.lock().unwrap_or_else(PoisonError::into_inner).take() {
                let _ = tx.send(Err(message));
            }
        }),
    );

    match rx.await {
        Ok(Ok(detected)) => Ok(detected),
        Ok(Err(message)) => Err(ProviderError::Rejected(message)),
        // Both callbacks dropped without being called
        Err(_) => Err(ProviderError::Dropped),
    }
}

#[async_trait]
impl<S, P> SecurityCheckProvider for LegacySdkAdapter<S, P>
where
    S: CallbackSecurityService + 'static,
    P: PinCheck + 'static,
{
    async fn check(&self, kind: CheckKind) -> Result<CheckOutcome, ProviderError> {
        match kind {
            CheckKind::NotRooted => {
                let rooted = bridge(|ok, err| self.service.is_rooted(ok, err)).await?;
                Ok(CheckOutcome::from_passed(!rooted))
            }
            CheckKind::NotDebugMode => {
                let debug = bridge(|ok, err| self.service.is_debug(ok, err)).await?;
                Ok(CheckOutcome::from_passed(!debug))
            }
            CheckKind::NotEmulated => Ok(CheckOutcome::from_passed(!self.device.is_virtual)),
            // Rejection is how the plugin says "no lock", not a plugin failure
            CheckKind::HasDeviceLock => match self.pin_check.is_pin_setup().await {
                Ok(()) => Ok(CheckOutcome::pass()),
                Err(reason) => {
                    debug!(%reason, "pin check rejected, treating as no device lock");
                    Ok(CheckOutcome::fail())
                }
            },
            CheckKind::LatestOs => Err(ProviderError::Unsupported(kind)),
        }
    }

    fn name(&self) -> &'static str {
        "legacy-sdk"
    }
}
