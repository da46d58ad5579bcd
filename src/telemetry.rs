// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Logging setup.
//!
//! Format: timestamp file:line LEVEL message
//! Example: 2025-11-29T23:45:00.123456Z controller.rs:88 INFO Starting Proxy controller
//!
//! Respects the `RUST_LOG` environment variable if set, otherwise defaults to
//! INFO level.

use crate::config::LogFormat;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "info";

/// Builds the level filter from `RUST_LOG`.
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Installs the global tracing subscriber.
///
/// # Panics
///
/// If a global subscriber is already installed.
pub fn init(format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_file(true)
        .with_line_number(true)
        .with_thread_names(true)
        .with_target(false);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.with_ansi(true).compact().init(),
    }
}
