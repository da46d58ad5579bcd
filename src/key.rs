// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Namespaced object identity used as the reconcile key.

use kube::runtime::reflector::{Lookup, ObjectRef};
use kube::{Resource, ResourceExt};
use std::fmt;

/// The `(namespace, name)` pair identifying one namespaced object.
///
/// Reconcile keys name a custom-resource instance; child objects share the
/// owner's key because their names are derived from it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReconcileKey {
    pub namespace: String,
    pub name: String,
}

impl ReconcileKey {
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key of an object's own metadata. A missing namespace maps to `""`.
    #[must_use]
    pub fn from_resource<K: Resource>(object: &K) -> Self {
        Self::new(ResourceExt::namespace(object).unwrap_or_default(), object.name_any())
    }
}

impl fmt::Display for ReconcileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl<K: Lookup + ?Sized> From<&ObjectRef<K>> for ReconcileKey {
    fn from(object_ref: &ObjectRef<K>) -> Self {
        Self::new(
            object_ref.namespace.clone().unwrap_or_default(),
            object_ref.name.clone(),
        )
    }
}
