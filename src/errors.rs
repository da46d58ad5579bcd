// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation error types.
//!
//! Every failure of a reconcile attempt is surfaced as a [`ReconcileError`] and
//! handed to the controller's error policy, which requeues the key with
//! backoff. Not-found on the owning resource is not an error; it ends the
//! reconcile successfully.
//!
//! Errors are classified as [`ErrorClass::Transient`] (rate limiting, server
//! errors, transport failures) or [`ErrorClass::Permanent`] (everything the
//! API server rejected on its merits, and owner-link failures). The class only
//! drives log level and metrics; both classes are retried.

use crate::key::ReconcileKey;
use crate::ownership::OwnerLinkError;
use thiserror::Error;

/// Errors returned by a single reconcile attempt.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Reading the custom resource failed for a reason other than not-found.
    #[error("failed to fetch {kind} {key}: {source}")]
    FetchOwner {
        kind: String,
        key: ReconcileKey,
        #[source]
        source: kube::Error,
    },

    /// Reading a child object failed for a reason other than not-found.
    #[error("failed to fetch {kind} {key}: {source}")]
    FetchChild {
        kind: String,
        key: ReconcileKey,
        #[source]
        source: kube::Error,
    },

    /// Creating a missing child object failed.
    #[error("failed to create {kind} {key}: {source}")]
    CreateChild {
        kind: String,
        key: ReconcileKey,
        #[source]
        source: kube::Error,
    },

    /// The controller reference could not be attached to a child.
    #[error(transparent)]
    OwnerLink(#[from] OwnerLinkError),
}

/// Retry classification of a [`ReconcileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Expected to succeed on a later attempt.
    Transient,
    /// Will keep failing until the cluster or the operator changes.
    Permanent,
}

impl ErrorClass {
    /// Metric label value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Permanent => "permanent",
        }
    }
}

impl ReconcileError {
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::FetchOwner { source, .. }
            | Self::FetchChild { source, .. }
            | Self::CreateChild { source, .. } => {
                if is_retryable_error(source) {
                    ErrorClass::Transient
                } else {
                    ErrorClass::Permanent
                }
            }
            Self::OwnerLink(_) => ErrorClass::Permanent,
        }
    }
}

/// Determine if a Kubernetes error is retryable.
///
/// # Retryable Errors
///
/// - **HTTP 409** (Conflict) - Concurrent writer, resolves on re-read
/// - **HTTP 429** (Too Many Requests) - Rate limiting
/// - **HTTP 5xx** (Server Errors) - Temporary API server issues
/// - **Service Errors** - Network/connection issues
///
/// Everything else (other 4xx responses, serialization failures, invalid
/// requests) is treated as permanent.
#[must_use]
pub fn is_retryable_error(err: &kube::Error) -> bool {
    match err {
        kube::Error::Api(api_err) => {
            api_err.code == 409
                || api_err.code == 429
                || (api_err.code >= 500 && api_err.code < 600)
        }
        kube::Error::Service(_) => true,
        _ => false,
    }
}

/// Whether `err` is the API server's not-found response.
#[must_use]
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(api_err) if api_err.code == 404)
}

/// Whether `err` is the API server's already-exists response to a create.
#[must_use]
pub fn is_already_exists(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(api_err) if api_err.code == 409 && api_err.reason == "AlreadyExists")
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
