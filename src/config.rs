// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Operator runtime configuration.
//!
//! Every option can be given as a command-line flag or through its
//! environment variable; the flag wins when both are set.
//!
//! | Flag | Environment | Default |
//! |------|-------------|---------|
//! | `--watch-namespace` | `WATCH_NAMESPACE` | all namespaces |
//! | `--concurrency` | `RECONCILE_CONCURRENCY` | `4` |
//! | `--metrics-bind-address` | `METRICS_BIND_ADDRESS` | `0.0.0.0:8080` |
//! | `--health-probe-bind-address` | `HEALTH_PROBE_BIND_ADDRESS` | `0.0.0.0:8081` |
//! | `--log-format` | `RUST_LOG_FORMAT` | `text` |
//!
//! The log level comes from `RUST_LOG` (default `info`).

use crate::constants::{
    DEFAULT_HEALTH_PROBE_BIND_ADDRESS, DEFAULT_METRICS_BIND_ADDRESS,
    DEFAULT_RECONCILE_CONCURRENCY,
};
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Command-line and environment configuration of the operator.
#[derive(Clone, Debug, Parser)]
#[command(name = "generator-operator", version, about)]
pub struct OperatorConfig {
    /// Only watch resources in this namespace. Empty or unset watches all namespaces.
    #[arg(long, env = "WATCH_NAMESPACE")]
    pub watch_namespace: Option<String>,

    /// Maximum number of reconciles running at once per controller
    #[arg(
        long,
        env = "RECONCILE_CONCURRENCY",
        default_value_t = DEFAULT_RECONCILE_CONCURRENCY,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub concurrency: u16,

    /// Address serving `/metrics`
    #[arg(long, env = "METRICS_BIND_ADDRESS", default_value = DEFAULT_METRICS_BIND_ADDRESS)]
    pub metrics_bind_address: SocketAddr,

    /// Address serving `/healthz` and `/readyz`
    #[arg(
        long,
        env = "HEALTH_PROBE_BIND_ADDRESS",
        default_value = DEFAULT_HEALTH_PROBE_BIND_ADDRESS
    )]
    pub health_probe_bind_address: SocketAddr,

    /// Log output format
    #[arg(long, env = "RUST_LOG_FORMAT", value_enum, ignore_case = true, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl OperatorConfig {
    /// Namespace all watches are restricted to, if any.
    #[must_use]
    pub fn watch_namespace(&self) -> Option<&str> {
        self.watch_namespace
            .as_deref()
            .map(str::trim)
            .filter(|ns| !ns.is_empty())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
