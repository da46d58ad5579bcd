// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the generator operator.
//!
//! All metrics carry the namespace prefix `generator_operator_`.
//!
//! # Metrics Categories
//!
//! - **Reconciliation Metrics** - Reconcile attempts, outcomes and durations
//! - **Child Object Metrics** - Children created, and children skipped because they already existed
//! - **Error Metrics** - Failed reconciles by retry class
//!
//! # Example
//!
//! ```rust,no_run
//! use generator_operator::metrics::{gather_metrics, record_reconciliation};
//!
//! record_reconciliation("Proxy", "reconciled", std::time::Duration::from_millis(40));
//! let text = gather_metrics().unwrap();
//! assert!(text.contains("generator_operator_reconciliations_total"));
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all operator metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "generator_operator";

/// Outcome label for failed reconciles
pub const OUTCOME_ERROR: &str = "error";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

fn register_counter(name: &str, help: &str, labels: &[&str]) -> CounterVec {
    let opts = Opts::new(format!("{METRICS_NAMESPACE}_{name}"), help);
    let counter = CounterVec::new(opts, labels).expect("counter options are valid");
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .expect("counter is registered once");
    counter
}

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Total number of reconciliations by resource type and outcome
///
/// Labels:
/// - `resource_type`: Kind of custom resource (`Generator`, `Proxy`, `ProxyService`)
/// - `outcome`: `reconciled`, `owner_missing` or `error`
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "reconciliations_total",
        "Total number of reconciliations by resource type and outcome",
        &["resource_type", "outcome"],
    )
});

/// Duration of reconciliations in seconds
///
/// Labels:
/// - `resource_type`: Kind of custom resource
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of reconciliations in seconds by resource type",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]);
    let histogram =
        HistogramVec::new(opts, &["resource_type"]).expect("histogram options are valid");
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("histogram is registered once");
    histogram
});

// ============================================================================
// Child Object Metrics
// ============================================================================

/// Total number of child objects created
///
/// Labels:
/// - `resource_type`: Kind of child (`DaemonSet`, `Service`)
pub static CHILDREN_CREATED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "children_created_total",
        "Total number of child objects created by type",
        &["resource_type"],
    )
});

/// Total number of child objects found already present and left untouched
///
/// Labels:
/// - `resource_type`: Kind of child (`DaemonSet`, `Service`)
pub static CHILDREN_SKIPPED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "children_skipped_total",
        "Total number of child objects that already existed by type",
        &["resource_type"],
    )
});

// ============================================================================
// Error Metrics
// ============================================================================

/// Total number of failed reconciles
///
/// Labels:
/// - `resource_type`: Kind of custom resource
/// - `error_class`: `transient` or `permanent`
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "errors_total",
        "Total number of failed reconciles by resource type and error class",
        &["resource_type", "error_class"],
    )
});

// ============================================================================
// Recording Functions
// ============================================================================

/// Record a finished reconcile attempt.
pub fn record_reconciliation(resource_type: &str, outcome: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, outcome])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record a child object creation.
pub fn record_child_created(resource_type: &str) {
    CHILDREN_CREATED_TOTAL
        .with_label_values(&[resource_type])
        .inc();
}

/// Record a child object that already existed.
pub fn record_child_skipped(resource_type: &str) {
    CHILDREN_SKIPPED_TOTAL
        .with_label_values(&[resource_type])
        .inc();
}

/// Record a failed reconcile.
pub fn record_error(resource_type: &str, error_class: &str) {
    ERRORS_TOTAL
        .with_label_values(&[resource_type, error_class])
        .inc();
}

/// Gather all metrics in Prometheus text format.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
