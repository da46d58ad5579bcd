// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom resource kinds that own child objects.

use super::child::{ChildKind, DesiredChild};
use crate::builders::{build_generator_daemonset, build_proxy_daemonset, build_proxy_service};
use crate::crd::{Generator, Proxy, ProxyService};
use crate::store::StoredResource;

/// A custom resource whose instances own a fixed set of children.
///
/// The controller for `Self` watches exactly [`Owner::OWNED_KINDS`], and
/// [`Owner::desired_children`] only returns children of those kinds.
pub trait Owner: StoredResource {
    /// Child kinds instances of this kind create.
    const OWNED_KINDS: &'static [ChildKind];

    /// Children that should exist for this instance, without owner references.
    fn desired_children(&self) -> Vec<DesiredChild>;
}

impl Owner for Generator {
    const OWNED_KINDS: &'static [ChildKind] = &[ChildKind::DaemonSet];

    fn desired_children(&self) -> Vec<DesiredChild> {
        vec![DesiredChild::Workload(build_generator_daemonset(self))]
    }
}

impl Owner for Proxy {
    const OWNED_KINDS: &'static [ChildKind] = &[ChildKind::DaemonSet];

    fn desired_children(&self) -> Vec<DesiredChild> {
        vec![DesiredChild::Workload(build_proxy_daemonset(self))]
    }
}

impl Owner for ProxyService {
    const OWNED_KINDS: &'static [ChildKind] = &[ChildKind::Service];

    fn desired_children(&self) -> Vec<DesiredChild> {
        vec![DesiredChild::Service(build_proxy_service(self))]
    }
}
