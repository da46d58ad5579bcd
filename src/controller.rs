// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Controller wiring for the custom resource kinds.
//!
//! Each kind gets one kube-runtime [`Controller`] that watches the kind itself
//! and the child kinds listed in [`Owner::OWNED_KINDS`]. Child events are
//! mapped back to the controlling owner through its controller reference.
//!
//! The controller's scheduler collapses repeated events for a key, never runs
//! two reconciles for the same key at once, and caps parallel reconciles at
//! the configured concurrency.

use crate::config::OperatorConfig;
use crate::errors::{ErrorClass, ReconcileError};
use crate::health::HealthState;
use crate::key::ReconcileKey;
use crate::metrics::{record_error, record_reconciliation, OUTCOME_ERROR};
use crate::reconcilers::retry::{default_backoff, ExponentialBackoff, RetryTracker};
use crate::reconcilers::{reconcile_key, ChildKind, Owner};
use crate::store::{KubeStore, ObjectStore, StoredResource};
use futures::StreamExt;
use k8s_openapi::api::{apps::v1::DaemonSet, core::v1::Service};
use kube::runtime::{controller, controller::Action, reflector::ObjectRef, watcher, Controller};
use kube::{Api, Client};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Shared state handed to every reconcile of one controller.
pub struct Context<S> {
    /// Object access used by the reconciler
    pub store: S,
    /// Consecutive failures per key
    pub retries: RetryTracker,
    /// Requeue schedule after failures
    pub backoff: ExponentialBackoff,
}

impl<S> Context<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_backoff(store, default_backoff())
    }

    #[must_use]
    pub fn with_backoff(store: S, backoff: ExponentialBackoff) -> Self {
        Self {
            store,
            retries: RetryTracker::new(),
            backoff,
        }
    }
}

/// Reconcile entry point handed to the [`Controller`].
///
/// Only the object's key is used; [`reconcile_key`] fetches the current state
/// itself.
///
/// # Errors
///
/// See [`reconcile_key`].
pub async fn reconcile<O, S>(object: Arc<O>, ctx: Arc<Context<S>>) -> Result<Action, ReconcileError>
where
    O: Owner,
    S: ObjectStore,
{
    let kind = O::kind(&());
    let key = ReconcileKey::from_resource(object.as_ref());
    let start = Instant::now();

    match reconcile_key::<O, S>(&ctx.store, &key).await {
        Ok(outcome) => {
            ctx.retries.reset(&key);
            record_reconciliation(&kind, outcome.as_str(), start.elapsed());
            debug!(kind = %kind, key = %key, outcome = outcome.as_str(), "Successfully reconciled {kind}");
            Ok(outcome.action())
        }
        Err(err) => {
            record_reconciliation(&kind, OUTCOME_ERROR, start.elapsed());
            Err(err)
        }
    }
}

/// Requeues a failed key after its next backoff delay.
///
/// Both error classes are retried; the class only changes the log level.
pub fn error_policy<O, S>(object: Arc<O>, err: &ReconcileError, ctx: Arc<Context<S>>) -> Action
where
    O: Owner,
{
    let kind = O::kind(&());
    let key = ReconcileKey::from_resource(object.as_ref());
    let attempt = ctx.retries.increment(&key);
    let delay = ctx.backoff.delay_for_attempt(attempt);
    let class = err.class();

    record_error(&kind, class.as_str());

    match class {
        ErrorClass::Transient => warn!(
            kind = %kind,
            key = %key,
            attempt,
            retry_after = ?delay,
            error = %err,
            "Failed to reconcile {kind}, will retry"
        ),
        ErrorClass::Permanent => error!(
            kind = %kind,
            key = %key,
            attempt,
            retry_after = ?delay,
            error = %err,
            "Failed to reconcile {kind}, will retry"
        ),
    }

    Action::requeue(delay)
}

/// Result item yielded by a running [`Controller`] for kind `O`.
pub type RunResult<O> =
    Result<(ObjectRef<O>, Action), controller::Error<ReconcileError, watcher::Error>>;

/// Logs one controller result and drops retry state for owners that are gone.
///
/// Once an owner leaves the watch cache the controller stops calling
/// [`reconcile`] for it and reports `ObjectNotFound` instead, so a failed key
/// would otherwise keep its attempt count for the life of the process.
pub fn observe_result<O, S>(ctx: &Context<S>, result: &RunResult<O>)
where
    O: Owner,
{
    match result {
        Ok((object, _action)) => debug!("Reconciled {object}"),
        Err(controller::Error::ObjectNotFound(object_ref)) => {
            let key = ReconcileKey::from(object_ref);
            ctx.retries.reset(&key);
            debug!(key = %key, "{} no longer exists, dropped retry state", O::kind(&()));
        }
        Err(err) => debug!(error = %err, "Reconcile stream error"),
    }
}

/// `Api` over all namespaces, or over `namespace` when set.
#[must_use]
pub fn scoped_api<K: StoredResource>(client: Client, namespace: Option<&str>) -> Api<K> {
    match namespace {
        Some(ns) => Api::namespaced(client, ns),
        None => Api::all(client),
    }
}

/// Adds an `owns` watch for every kind in `O::OWNED_KINDS`.
fn register_owned<O: Owner>(
    controller: Controller<O>,
    client: &Client,
    namespace: Option<&str>,
) -> Controller<O> {
    let owner_kind = O::kind(&());
    O::OWNED_KINDS.iter().fold(controller, |controller, kind| {
        debug!(owner = %owner_kind, child = %kind, "Watching owned {kind}");
        match kind {
            ChildKind::DaemonSet => controller.owns(
                scoped_api::<DaemonSet>(client.clone(), namespace),
                watcher::Config::default(),
            ),
            ChildKind::Service => controller.owns(
                scoped_api::<Service>(client.clone(), namespace),
                watcher::Config::default(),
            ),
        }
    })
}

/// Runs the controller for kind `O` until its watch streams end.
///
/// `health` is told once the watches are registered.
pub async fn run_controller<O: Owner>(client: Client, config: &OperatorConfig, health: &HealthState) {
    let kind = O::kind(&());
    let namespace = config.watch_namespace();

    info!(
        kind = %kind,
        namespace = namespace.unwrap_or("<all>"),
        concurrency = config.concurrency,
        "Starting {kind} controller"
    );

    let api = scoped_api::<O>(client.clone(), namespace);
    let ctx = Arc::new(Context::new(KubeStore::new(client.clone())));

    let results = register_owned(Controller::new(api, watcher::Config::default()), &client, namespace)
        .with_config(controller::Config::default().concurrency(config.concurrency))
        .run(reconcile::<O, KubeStore>, error_policy::<O, KubeStore>, ctx.clone());
    health.controller_started();

    results
        .for_each(|res| {
            observe_result::<O, KubeStore>(&ctx, &res);
            futures::future::ready(())
        })
        .await;
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod controller_tests;
