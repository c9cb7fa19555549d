// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "DEVICE_TRUST_LOG";

static INIT: Once = Once::new();

/// Install the global subscriber
///
/// Reads the filter from `DEVICE_TRUST_LOG` (e.g. `connectias_trust=debug`),
/// falling back to `connectias_trust=info`. Safe to call more than once; a
/// subscriber installed elsewhere (tests) is left in place.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new("connectias_trust=info"));

        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .try_init();
    });
}
