// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Child objects a custom resource wants to exist.

use crate::key::ReconcileKey;
use crate::ownership::{controller_owner_key, set_controller_reference, OwnerLinkError};
use crate::store::{ObjectStore, StoredResource};
use k8s_openapi::api::{apps::v1::DaemonSet, core::v1::Service};
use kube::Resource;
use std::fmt;

/// Kinds of child objects the operator creates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChildKind {
    DaemonSet,
    Service,
}

impl ChildKind {
    /// Kubernetes kind name, also used as the metric label value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DaemonSet => "DaemonSet",
            Self::Service => "Service",
        }
    }
}

impl fmt::Display for ChildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one child object, reported in reconcile outcomes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChildRef {
    pub kind: ChildKind,
    pub key: ReconcileKey,
}

impl fmt::Display for ChildRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.key)
    }
}

/// A built child object.
///
/// The same type carries the desired object produced by the builders and the
/// copy found in the store, so both sides can be inspected the same way.
#[derive(Clone, Debug, PartialEq)]
pub enum DesiredChild {
    /// Per-node workload
    Workload(DaemonSet),
    /// Network endpoint
    Service(Service),
}

impl DesiredChild {
    #[must_use]
    pub fn kind(&self) -> ChildKind {
        match self {
            Self::Workload(_) => ChildKind::DaemonSet,
            Self::Service(_) => ChildKind::Service,
        }
    }

    #[must_use]
    pub fn key(&self) -> ReconcileKey {
        match self {
            Self::Workload(ds) => ReconcileKey::from_resource(ds),
            Self::Service(svc) => ReconcileKey::from_resource(svc),
        }
    }

    #[must_use]
    pub fn child_ref(&self) -> ChildRef {
        ChildRef {
            kind: self.kind(),
            key: self.key(),
        }
    }

    /// Sets `owner` as this child's controller.
    ///
    /// # Errors
    ///
    /// See [`set_controller_reference`].
    pub fn link_owner<O>(&mut self, owner: &O) -> Result<(), OwnerLinkError>
    where
        O: Resource<DynamicType = ()>,
    {
        match self {
            Self::Workload(ds) => set_controller_reference(owner, ds),
            Self::Service(svc) => set_controller_reference(owner, svc),
        }
    }

    /// Key of the `O` controlling this child, if any.
    #[must_use]
    pub fn controlled_by<O>(&self) -> Option<ReconcileKey>
    where
        O: Resource<DynamicType = ()>,
    {
        match self {
            Self::Workload(ds) => controller_owner_key::<O, _>(ds),
            Self::Service(svc) => controller_owner_key::<O, _>(svc),
        }
    }

    /// Looks up the object with this child's kind and key.
    ///
    /// # Errors
    ///
    /// Any store failure other than not-found.
    pub async fn find<S: ObjectStore>(&self, store: &S) -> Result<Option<Self>, kube::Error> {
        let key = self.key();
        Ok(match self {
            Self::Workload(_) => fetch::<DaemonSet, _>(store, &key)
                .await?
                .map(Self::Workload),
            Self::Service(_) => fetch::<Service, _>(store, &key)
                .await?
                .map(Self::Service),
        })
    }

    /// Creates this child in the store.
    ///
    /// # Errors
    ///
    /// Any store failure, including already-exists.
    pub async fn create<S: ObjectStore>(&self, store: &S) -> Result<(), kube::Error> {
        match self {
            Self::Workload(ds) => store.create(ds).await.map(drop),
            Self::Service(svc) => store.create(svc).await.map(drop),
        }
    }
}

async fn fetch<K: StoredResource, S: ObjectStore>(
    store: &S,
    key: &ReconcileKey,
) -> Result<Option<K>, kube::Error> {
    store.get::<K>(&key.namespace, &key.name).await
}

#[cfg(test)]
#[path = "child_tests.rs"]
mod child_tests;
