// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::Parser;
use generator_operator::{
    config::OperatorConfig,
    constants::TOKIO_WORKER_THREADS,
    controller::run_controller,
    crd::{Generator, Proxy, ProxyService},
    health::{run_metrics_server, run_probe_server, HealthState},
    telemetry,
};
use kube::Client;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Controllers started by the manager, one per custom resource kind
const CONTROLLER_COUNT: usize = 3;

fn main() -> Result<()> {
    let config = OperatorConfig::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("generator-operator")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

async fn async_main(config: OperatorConfig) -> Result<()> {
    telemetry::init(config.log_format);

    info!("Starting generator operator");
    debug!(?config, "Loaded configuration");

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let health = Arc::new(HealthState::new(CONTROLLER_COUNT));

    info!("Starting all controllers");

    // Controllers and servers should never exit. Dropping the other branches
    // on shutdown abandons in-flight reconciles; they are replayed from the
    // watches on the next start.
    tokio::select! {
        () = run_controller::<Generator>(client.clone(), &config, &health) => {
            error!("CRITICAL: Generator controller exited unexpectedly");
            anyhow::bail!("Generator controller exited unexpectedly")
        }
        () = run_controller::<Proxy>(client.clone(), &config, &health) => {
            error!("CRITICAL: Proxy controller exited unexpectedly");
            anyhow::bail!("Proxy controller exited unexpectedly")
        }
        () = run_controller::<ProxyService>(client.clone(), &config, &health) => {
            error!("CRITICAL: ProxyService controller exited unexpectedly");
            anyhow::bail!("ProxyService controller exited unexpectedly")
        }
        result = run_metrics_server(config.metrics_bind_address) => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Metrics server exited unexpectedly without error")
        }
        result = run_probe_server(health.clone(), config.health_probe_bind_address) => {
            error!("CRITICAL: health probe server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Health probe server exited unexpectedly without error")
        }
        result = shutdown_signal() => {
            result?;
            info!("Stopping all controllers");
            Ok(())
        }
    }
}

/// Completes on SIGINT, or on SIGTERM where available.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                info!("Received SIGINT, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM (pod termination), shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!("Received Ctrl+C, shutting down");
    }

    Ok(())
}
