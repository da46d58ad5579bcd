// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP endpoints for probes and metrics.
//!
//! - `/healthz` (liveness) answers 200 while the process runs.
//! - `/readyz` (readiness) answers 503 until the controllers have started.
//! - `/metrics` serves the Prometheus registry in text format.
//!
//! Probes and metrics listen on separate addresses.

use crate::metrics::gather_metrics;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Content type of the Prometheus text exposition format.
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Shared state for the readiness endpoint.
///
/// The operator is ready once every controller has registered its watches.
#[derive(Debug)]
pub struct HealthState {
    pending: AtomicUsize,
}

impl HealthState {
    /// State waiting on `controllers` controllers to start.
    #[must_use]
    pub fn new(controllers: usize) -> Self {
        Self {
            pending: AtomicUsize::new(controllers),
        }
    }

    /// Record that one controller has started.
    pub fn controller_started(&self) {
        let previous = self
            .pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .unwrap_or(0);
        if previous == 1 {
            info!("Health check: all controllers started, operator marked as ready");
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.pending.load(Ordering::SeqCst) == 0
    }
}

/// Router serving `/healthz` and `/readyz`.
pub fn probe_router(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .with_state(state)
}

/// Router serving `/metrics`.
pub fn metrics_router() -> Router {
    Router::new().route("/metrics", get(metrics))
}

/// Serves the probe endpoints on `addr` until the listener fails.
///
/// # Errors
///
/// Binding or accepting on `addr` failed.
pub async fn run_probe_server(state: Arc<HealthState>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(address = %addr, "Health probe server listening");
    axum::serve(listener, probe_router(state)).await
}

/// Serves `/metrics` on `addr` until the listener fails.
///
/// # Errors
///
/// Binding or accepting on `addr` failed.
pub async fn run_metrics_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(address = %addr, "Metrics server listening");
    axum::serve(listener, metrics_router()).await
}

/// Liveness probe endpoint.
async fn healthz() -> StatusCode {
    debug!("Liveness probe: OK");
    StatusCode::OK
}

/// Readiness probe endpoint.
async fn readyz(State(state): State<Arc<HealthState>>) -> StatusCode {
    if state.is_ready() {
        debug!("Readiness probe: OK");
        StatusCode::OK
    } else {
        debug!("Readiness probe: NOT READY (controllers not started)");
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics() -> Response {
    match gather_metrics() {
        Ok(body) => ([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod health_tests;
