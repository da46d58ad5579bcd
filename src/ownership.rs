// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Controller owner references between custom resources and their children.
//!
//! A controller reference on a child lets the platform garbage collector
//! cascade-delete it with its owner, and lets the controller's `owns` watch map
//! child events back to the owner's reconcile key.
//!
//! The rules match the API server's expectations for controller references:
//!
//! - the owner must have a name and a UID,
//! - a namespaced owner can only own objects in its own namespace,
//! - an object has at most one controller; linking to a second owner fails,
//! - linking the same owner twice replaces the existing reference.

use crate::key::ReconcileKey;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::{Resource, ResourceExt};
use thiserror::Error;

/// Errors raised while attaching a controller reference.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OwnerLinkError {
    /// The owner has not been persisted yet, or its metadata was stripped.
    #[error("{kind} '{name}' has no name or UID and cannot own other objects")]
    MissingOwnerIdentity {
        /// Kind of the would-be owner
        kind: String,
        /// Name of the would-be owner (may be empty)
        name: String,
    },

    /// Owner and child live in different namespaces.
    #[error(
        "cross-namespace owner references are disallowed: {owner_kind} in '{owner_namespace}' cannot own {child_kind} in '{child_namespace}'"
    )]
    CrossNamespace {
        owner_kind: String,
        owner_namespace: String,
        child_kind: String,
        child_namespace: String,
    },

    /// The child is already controlled by another object.
    #[error("{child_kind} '{child_name}' is already controlled by {existing_kind} '{existing_name}'")]
    AlreadyOwned {
        child_kind: String,
        child_name: String,
        existing_kind: String,
        existing_name: String,
    },
}

/// Sets `owner` as the controller of `child`.
///
/// The reference carries `controller: true` and `blockOwnerDeletion: true`.
/// An existing reference to the same owner is replaced in place; references to
/// other, non-controlling owners are left untouched.
///
/// # Errors
///
/// See [`OwnerLinkError`] for the rejected cases.
///
/// # Example
///
/// ```rust
/// use generator_operator::builders::build_proxy_daemonset;
/// use generator_operator::crd::{Proxy, ProxySpec};
/// use generator_operator::ownership::set_controller_reference;
///
/// let mut proxy = Proxy::new("edge", ProxySpec::default());
/// proxy.metadata.namespace = Some("ops".into());
/// proxy.metadata.uid = Some("4f1c".into());
///
/// let mut ds = build_proxy_daemonset(&proxy);
/// set_controller_reference(&proxy, &mut ds).unwrap();
/// assert_eq!(ds.metadata.owner_references.unwrap()[0].kind, "Proxy");
/// ```
pub fn set_controller_reference<O, C>(owner: &O, child: &mut C) -> Result<(), OwnerLinkError>
where
    O: Resource<DynamicType = ()>,
    C: Resource<DynamicType = ()>,
{
    let owner_kind = O::kind(&()).to_string();
    let child_kind = C::kind(&()).to_string();

    let (Some(name), Some(uid)) = (owner.meta().name.clone(), owner.meta().uid.clone()) else {
        return Err(OwnerLinkError::MissingOwnerIdentity {
            kind: owner_kind,
            name: owner.meta().name.clone().unwrap_or_default(),
        });
    };

    if let Some(owner_namespace) = owner.namespace() {
        let child_namespace = child.namespace().unwrap_or_default();
        if owner_namespace != child_namespace {
            return Err(OwnerLinkError::CrossNamespace {
                owner_kind,
                owner_namespace,
                child_kind,
                child_namespace,
            });
        }
    }

    let reference = OwnerReference {
        api_version: O::api_version(&()).to_string(),
        kind: owner_kind,
        name,
        uid,
        controller: Some(true),
        block_owner_deletion: Some(true),
    };

    let child_name = child.name_any();
    let references = child
        .meta_mut()
        .owner_references
        .get_or_insert_with(Vec::new);

    if let Some(existing) = references
        .iter()
        .find(|r| r.controller == Some(true) && !refers_to_same_object(r, &reference))
    {
        return Err(OwnerLinkError::AlreadyOwned {
            child_kind,
            child_name,
            existing_kind: existing.kind.clone(),
            existing_name: existing.name.clone(),
        });
    }

    match references
        .iter_mut()
        .find(|r| refers_to_same_object(r, &reference))
    {
        Some(slot) => *slot = reference,
        None => references.push(reference),
    }

    Ok(())
}

/// Returns the key of the `O` that controls `child`, if any.
///
/// Owner references carry no namespace; a namespaced owner always lives in
/// its child's namespace.
#[must_use]
pub fn controller_owner_key<O, C>(child: &C) -> Option<ReconcileKey>
where
    O: Resource<DynamicType = ()>,
    C: Resource,
{
    let owner_kind = O::kind(&());
    let owner_group = O::group(&());

    child
        .owner_references()
        .iter()
        .find(|r| {
            r.controller == Some(true)
                && r.kind == owner_kind
                && api_group(&r.api_version) == owner_group
        })
        .map(|r| ReconcileKey::new(child.namespace().unwrap_or_default(), r.name.clone()))
}

/// Group, kind and name identify an owner; the version may differ between
/// references written by different clients.
fn refers_to_same_object(a: &OwnerReference, b: &OwnerReference) -> bool {
    api_group(&a.api_version) == api_group(&b.api_version) && a.kind == b.kind && a.name == b.name
}

/// `apps/v1` → `apps`, `v1` → `""`.
fn api_group(api_version: &str) -> &str {
    api_version
        .rsplit_once('/')
        .map_or("", |(group, _version)| group)
}

#[cfg(test)]
#[path = "ownership_tests.rs"]
mod ownership_tests;
