// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-key exponential backoff for failed reconciles.
//!
//! The controller's error policy asks [`RetryTracker::increment`] for the
//! key's attempt number and requeues after
//! [`ExponentialBackoff::delay_for_attempt`]. A successful reconcile resets
//! the key. There is no attempt limit; a failing key keeps retrying at the
//! capped interval.

use crate::key::ReconcileKey;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Initial retry interval (1 second)
const INITIAL_INTERVAL_SECS: u64 = 1;

/// Maximum interval between retries (5 minutes)
const MAX_INTERVAL_SECS: u64 = 300;

/// Backoff multiplier (exponential growth factor)
const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Randomization factor to prevent thundering herd (±10%)
const RANDOMIZATION_FACTOR: f64 = 0.1;

/// Exponent past which every delay is already capped.
const MAX_EXPONENT: i32 = 64;

/// Exponential backoff with jitter.
#[derive(Clone, Debug, PartialEq)]
pub struct ExponentialBackoff {
    /// Delay before the first retry
    pub initial_interval: Duration,
    /// Upper bound of any delay, before jitter
    pub max_interval: Duration,
    /// Backoff multiplier (typically 2.0 for doubling)
    pub multiplier: f64,
    /// Randomization factor (e.g., 0.1 for ±10%)
    pub randomization_factor: f64,
}

impl ExponentialBackoff {
    #[must_use]
    pub fn new(
        initial_interval: Duration,
        max_interval: Duration,
        multiplier: f64,
        randomization_factor: f64,
    ) -> Self {
        Self {
            initial_interval,
            max_interval,
            multiplier,
            randomization_factor,
        }
    }

    /// Delay before retry number `attempt` (1-based), without jitter.
    ///
    /// Attempt 0 is treated as attempt 1.
    #[must_use]
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1))
            .unwrap_or(MAX_EXPONENT)
            .min(MAX_EXPONENT);
        let secs = self.initial_interval.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = secs.min(self.max_interval.as_secs_f64());
        Duration::from_secs_f64(capped.max(0.0))
    }

    /// Delay before retry number `attempt` (1-based), with jitter applied.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.apply_jitter(self.base_delay(attempt))
    }

    /// Apply randomization (jitter) to an interval.
    fn apply_jitter(&self, interval: Duration) -> Duration {
        if self.randomization_factor == 0.0 {
            return interval;
        }

        let secs = interval.as_secs_f64();
        let delta = secs * self.randomization_factor;
        let jittered = secs - delta + rand::random::<f64>() * 2.0 * delta;

        Duration::from_secs_f64(jittered.max(0.0))
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        default_backoff()
    }
}

/// Create default exponential backoff configuration for failed reconciles.
///
/// # Configuration
///
/// - **Initial interval**: 1 second
/// - **Max interval**: 5 minutes
/// - **Multiplier**: 2.0 (exponential growth)
/// - **Randomization**: ±10% (prevents thundering herd)
///
/// # Retry Schedule
///
/// 1s, 2s, 4s, 8s, 16s, 32s, 64s, 128s, 256s, then 300s for every later
/// attempt.
#[must_use]
pub fn default_backoff() -> ExponentialBackoff {
    ExponentialBackoff::new(
        Duration::from_secs(INITIAL_INTERVAL_SECS),
        Duration::from_secs(MAX_INTERVAL_SECS),
        BACKOFF_MULTIPLIER,
        RANDOMIZATION_FACTOR,
    )
}

/// Tracks consecutive failed attempts per reconcile key.
#[derive(Debug, Default)]
pub struct RetryTracker {
    attempts: Mutex<HashMap<ReconcileKey, u32>>,
}

impl RetryTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ReconcileKey, u32>> {
        self.attempts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Increment retry count for a key and return the new count
    pub fn increment(&self, key: &ReconcileKey) -> u32 {
        let mut attempts = self.lock();
        let count = attempts.entry(key.clone()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Reset retry count for a key (call on successful reconciliation)
    pub fn reset(&self, key: &ReconcileKey) {
        self.lock().remove(key);
    }

    /// Get current retry count for a key
    #[must_use]
    pub fn get(&self, key: &ReconcileKey) -> u32 {
        self.lock().get(key).copied().unwrap_or(0)
    }

    /// Whether the key has outstanding failures
    #[must_use]
    pub fn contains(&self, key: &ReconcileKey) -> bool {
        self.lock().contains_key(key)
    }

    /// Number of keys with outstanding failures
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod retry_tests;
