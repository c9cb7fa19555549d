// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Connectias

//! device-trust - run a trust session against a fixture and print the report

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use connectias_trust::logging::init_tracing;
use connectias_trust::provider::FixtureProvider;
use connectias_trust::{ChannelSink, CheckRunner, TrustConfig};
use tracing::debug;

mod render;

#[derive(Parser, Debug)]
#[command(name = "device-trust", version, about = "Run device integrity checks and print a trust report")]
struct Cli {
    /// JSON fixture with device info and check outcomes
    #[arg(long)]
    fixture: PathBuf,

    /// TOML config (thresholds, timeouts, metrics collector)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the final trust state as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TrustConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TrustConfig::default(),
    };
    debug!(?config, "configuration loaded");

    let provider = FixtureProvider::from_file(&cli.fixture)
        .with_context(|| format!("Failed to load fixture {}", cli.fixture.display()))?;
    let device = provider.device().clone();

    let (sink, mut events) = ChannelSink::new();
    let runner = CheckRunner::from_config(Arc::new(provider), device, &config)
        .context("Failed to set up metrics publisher")?
        .with_sink(Arc::new(sink));

    let quiet = cli.json;
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if quiet {
                continue;
            }
            if let Some(line) = render::render_event(&event) {
                println!("{}", line);
            }
        }
    });

    let state = runner.perform_checks().await;
    // Closes the event channel
    drop(runner);
    printer.await.context("Event printer failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        println!("{}", state.summary());
    }

    Ok(())
}
