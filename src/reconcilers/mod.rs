// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Create-if-absent reconciliation of custom resources.
//!
//! Every kind follows the same steps for a reconcile key:
//!
//! 1. **Fetch** the custom resource. If it is gone, stop: its children are
//!    garbage-collected through their owner references.
//! 2. **Build** the desired children from the instance's name and namespace.
//! 3. **Link** each child to the instance with a controller reference. All
//!    children are linked before anything is written.
//! 4. **Create if absent**: a child that already exists is left untouched,
//!    whatever its content. Existing children are never updated.
//!
//! No status is written back, and a successful reconcile is never requeued;
//! the next reconcile comes from a change to the resource or one of its
//! children.
//!
//! # Example
//!
//! ```rust,no_run
//! use generator_operator::crd::{Proxy, ProxySpec};
//! use generator_operator::key::ReconcileKey;
//! use generator_operator::reconcilers::{reconcile_key, ReconcileOutcome};
//! use generator_operator::store::InMemoryStore;
//!
//! # async fn example() {
//! let store = InMemoryStore::new();
//! let mut proxy = Proxy::new("edge", ProxySpec::default());
//! proxy.metadata.namespace = Some("ops".into());
//! store.insert(proxy);
//!
//! let outcome = reconcile_key::<Proxy, _>(&store, &ReconcileKey::new("ops", "edge"))
//!     .await
//!     .unwrap();
//! assert!(matches!(outcome, ReconcileOutcome::Reconciled { .. }));
//! assert_eq!(store.write_count(), 1);
//! # }
//! ```

pub mod child;
pub mod owner;
pub mod retry;

pub use child::{ChildKind, ChildRef, DesiredChild};
pub use owner::Owner;

use crate::errors::{is_already_exists, is_not_found, ReconcileError};
use crate::key::ReconcileKey;
use crate::metrics::{record_child_created, record_child_skipped};
use crate::store::ObjectStore;
use kube::runtime::controller::Action;
use tracing::{debug, info, warn};

/// Result of one successful reconcile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The custom resource no longer exists; nothing was done.
    OwnerMissing,
    /// Every desired child exists.
    Reconciled {
        /// Children created by this reconcile
        created: Vec<ChildRef>,
        /// Children that were already present and left as they were
        existing: Vec<ChildRef>,
    },
}

impl ReconcileOutcome {
    /// Metric label value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OwnerMissing => "owner_missing",
            Self::Reconciled { .. } => "reconciled",
        }
    }

    /// Scheduling decision for the controller. Successful outcomes wait for
    /// the next watch event.
    #[must_use]
    pub fn action(&self) -> Action {
        Action::await_change()
    }
}

/// Reconciles the `O` instance named by `key`.
///
/// # Errors
///
/// - [`ReconcileError::FetchOwner`] if the instance cannot be read
/// - [`ReconcileError::OwnerLink`] if a child cannot be linked; nothing is written
/// - [`ReconcileError::FetchChild`] / [`ReconcileError::CreateChild`] on
///   store failures. Children created before the failure are kept.
pub async fn reconcile_key<O, S>(
    store: &S,
    key: &ReconcileKey,
) -> Result<ReconcileOutcome, ReconcileError>
where
    O: Owner,
    S: ObjectStore,
{
    let kind = O::kind(&()).to_string();

    let owner = match store.get::<O>(&key.namespace, &key.name).await {
        Ok(found) => found,
        Err(source) if is_not_found(&source) => None,
        Err(source) => {
            return Err(ReconcileError::FetchOwner {
                kind,
                key: key.clone(),
                source,
            })
        }
    };

    let Some(owner) = owner else {
        info!(kind = %kind, namespace = %key.namespace, name = %key.name, "{kind} not found, nothing to reconcile");
        return Ok(ReconcileOutcome::OwnerMissing);
    };

    debug!(kind = %kind, namespace = %key.namespace, name = %key.name, "Reconciling {kind}");

    let mut children = owner.desired_children();
    for child in &mut children {
        child.link_owner(&owner)?;
    }

    let mut created = Vec::new();
    let mut existing = Vec::new();

    for child in &children {
        let child_ref = child.child_ref();

        let found = match child.find(store).await {
            Ok(found) => found,
            Err(source) if is_not_found(&source) => None,
            Err(source) => {
                return Err(ReconcileError::FetchChild {
                    kind: child_ref.kind.to_string(),
                    key: child_ref.key,
                    source,
                })
            }
        };

        if let Some(current) = found {
            match current.controlled_by::<O>() {
                Some(controller) if controller == *key => {}
                Some(controller) => warn!(
                    kind = %kind,
                    child = %child_ref,
                    controller = %controller,
                    "Existing {} is controlled by another {kind}",
                    child_ref.kind
                ),
                None => debug!(
                    kind = %kind,
                    child = %child_ref,
                    "Existing {} has no {kind} controller",
                    child_ref.kind
                ),
            }
            info!(kind = %kind, namespace = %key.namespace, name = %key.name, "Skip reconcile: {child_ref} already exists");
            record_child_skipped(child_ref.kind.as_str());
            existing.push(child_ref);
            continue;
        }

        match child.create(store).await {
            Ok(()) => {
                info!(kind = %kind, namespace = %key.namespace, name = %key.name, "Created {child_ref}");
                record_child_created(child_ref.kind.as_str());
                created.push(child_ref);
            }
            Err(source) if is_already_exists(&source) => {
                info!(kind = %kind, namespace = %key.namespace, name = %key.name, "Skip reconcile: {child_ref} already exists");
                record_child_skipped(child_ref.kind.as_str());
                existing.push(child_ref);
            }
            Err(source) => {
                return Err(ReconcileError::CreateChild {
                    kind: child_ref.kind.to_string(),
                    key: child_ref.key,
                    source,
                })
            }
        }
    }

    Ok(ReconcileOutcome::Reconciled { created, existing })
}
