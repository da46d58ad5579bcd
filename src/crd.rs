// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) watched by the operator.
//!
//! # Resource Types
//!
//! - [`Generator`] - Runs the traffic generator on every control-plane node
//! - [`Proxy`] - Runs the log proxy on every control-plane node
//! - [`ProxyService`] - Exposes the proxy pods behind a `Service`
//!
//! None of the specs carry fields today: the operator only reads
//! `metadata.name` and `metadata.namespace`, and every child object is built
//! from constants. The empty specs still register a structural schema so the
//! kinds can be applied with `kubectl`.
//!
//! # Example
//!
//! ```rust,no_run
//! use generator_operator::crd::{Proxy, ProxySpec};
//!
//! let proxy = Proxy::new("edge", ProxySpec::default());
//! assert_eq!(proxy.metadata.name.as_deref(), Some("edge"));
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `Generator` runs the traffic generator `DaemonSet`.
///
/// # Example
///
/// ```yaml
/// apiVersion: managed.openshift.io/v1alpha1
/// kind: Generator
/// metadata:
///   name: generator
///   namespace: openshift-traffic-gen-operator
/// spec: {}
/// ```
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "managed.openshift.io",
    version = "v1alpha1",
    kind = "Generator",
    namespaced,
    doc = "Generator runs a privileged traffic generator pod on every control-plane node."
)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorSpec {}

/// `Proxy` runs the log proxy `DaemonSet`.
///
/// Proxy pods mount the host's `/var/log/` and post entries back to the
/// in-cluster proxy service.
///
/// # Example
///
/// ```yaml
/// apiVersion: managed.openshift.io/v1alpha1
/// kind: Proxy
/// metadata:
///   name: edge
///   namespace: ops
/// spec: {}
/// ```
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "managed.openshift.io",
    version = "v1alpha1",
    kind = "Proxy",
    namespaced,
    doc = "Proxy runs a privileged log proxy pod on every control-plane node."
)]
#[serde(rename_all = "camelCase")]
pub struct ProxySpec {}

/// `ProxyService` exposes pods labelled `name: Proxy` on port 8080.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "managed.openshift.io",
    version = "v1alpha1",
    kind = "ProxyService",
    namespaced,
    doc = "ProxyService exposes the proxy pods through a ClusterIP Service."
)]
#[serde(rename_all = "camelCase")]
pub struct ProxyServiceSpec {}
