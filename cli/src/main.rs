// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Corral Lifecycle Daemon
//!
//! The `corral` binary hosts the agent-runtime lifecycle orchestrator:
//! it loads the YAML configuration, wires the registry, the remote provider
//! adapter and the event notifier together, and serves the HTTP API.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use corral_core::application::lifecycle::{LifecycleSettings, RuntimeLifecycleService};
use corral_core::domain::service_config::OrchestratorConfig;
use corral_core::infrastructure::{BroadcastNotifier, HttpRuntimeProvider, InMemoryRuntimeRegistry};
use corral_core::presentation::api;

/// Corral - agent runtime lifecycle orchestrator
#[derive(Parser)]
#[command(name = "corral")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        env = "CORRAL_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// HTTP API host (overrides configuration)
    #[arg(long, env = "CORRAL_HOST")]
    host: Option<String>,

    /// HTTP API port (overrides configuration)
    #[arg(long, env = "CORRAL_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CORRAL_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone())),
        )
        .init();

    let mut config = load_config(&cli)?;
    if let Some(host) = cli.host {
        config.listen_host = host;
    }
    if let Some(port) = cli.port {
        config.listen_port = port;
    }

    let registry = Arc::new(InMemoryRuntimeRegistry::new());
    let provider = Arc::new(HttpRuntimeProvider::new(config.provider_base_url.clone()));
    let notifier = BroadcastNotifier::with_default_capacity();

    let service = Arc::new(RuntimeLifecycleService::new(
        registry,
        provider,
        Arc::new(notifier.clone()),
        LifecycleSettings::from(&config),
    ));

    let router = api::app(service, notifier);

    let address = format!("{}:{}", config.listen_host, config.listen_port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    info!(
        address,
        provider = %config.provider_base_url,
        "corral lifecycle daemon listening"
    );

    axum::serve(listener, router)
        .await
        .context("HTTP server terminated")?;

    Ok(())
}

fn load_config(cli: &Cli) -> Result<OrchestratorConfig> {
    let path = cli.config.clone().or_else(OrchestratorConfig::discover_config);
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            OrchestratorConfig::from_yaml_file(&path)
                .with_context(|| format!("failed to load {}", path.display()))
        }
        None => {
            info!("no configuration file found; using defaults");
            Ok(OrchestratorConfig::default())
        }
    }
}
