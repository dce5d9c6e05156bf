// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use kube::Client;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use namespace_watcher::config::Config;
use namespace_watcher::health::{HealthServer, Readiness};
use namespace_watcher::shutdown::{wait_for_termination, Shutdown};
use namespace_watcher::sources::EventSource;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting namespace watcher");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded: mode={:?}, excluded_namespaces={:?}, health_probe_port={}",
        config.watch_mode, config.excluded_namespaces, config.health_probe_port
    );

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;
    info!("Connected to Kubernetes cluster");

    let readiness = Readiness::new();
    let (shutdown, signal) = Shutdown::new();

    let health_server = HealthServer::new(config.health_probe_port, readiness.clone());
    let source = EventSource::from_config(client, &config);
    info!("Starting {} event source", source.name());

    let termination = async {
        if let Err(e) = wait_for_termination().await {
            error!("Failed to listen for termination signals: {}", e);
        }
        info!("Shutting down namespace watcher");
        shutdown.trigger();
        Ok::<_, anyhow::Error>(())
    };

    tokio::try_join!(
        termination,
        async {
            health_server
                .run(signal.clone())
                .await
                .context("Health server stopped")
        },
        async {
            source
                .run(readiness.clone(), signal.clone())
                .await
                .context("Event source stopped")
        },
    )?;

    info!("Namespace watcher stopped");
    Ok(())
}
