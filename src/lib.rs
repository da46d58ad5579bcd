// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Generator Operator
//!
//! A Kubernetes operator that materialises three custom resources into the
//! objects that run them:
//!
//! | Custom resource | Child object |
//! |-----------------|--------------|
//! | [`crd::Generator`] | privileged traffic generator `DaemonSet` |
//! | [`crd::Proxy`] | privileged log proxy `DaemonSet` |
//! | [`crd::ProxyService`] | `Service` in front of the proxy pods |
//!
//! Reconciliation is create-if-absent: a missing child is created with a
//! controller reference to its custom resource, and an existing child is never
//! modified. Deleting a custom resource leaves cleanup to the platform's
//! garbage collector.
//!
//! ## Modules
//!
//! - [`crd`] - Custom Resource Definition types
//! - [`builders`] - Desired child objects for each custom resource
//! - [`ownership`] - Controller owner references
//! - [`store`] - Object access used by the reconcilers
//! - [`reconcilers`] - Create-if-absent reconciliation and retry backoff
//! - [`controller`] - kube-runtime controller wiring
//! - [`config`], [`telemetry`], [`metrics`], [`health`] - Operator runtime
//!
//! ## Example
//!
//! ```rust
//! use generator_operator::builders::build_proxy_service;
//! use generator_operator::crd::{ProxyService, ProxyServiceSpec};
//!
//! let mut svc = ProxyService::new("proxy", ProxyServiceSpec::default());
//! svc.metadata.namespace = Some("openshift-traffic-gen-operator".into());
//!
//! let service = build_proxy_service(&svc);
//! let spec = service.spec.unwrap();
//! assert_eq!(spec.selector.unwrap()["name"], "Proxy");
//! ```

pub mod builders;
pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod errors;
pub mod health;
pub mod key;
pub mod labels;
pub mod metrics;
pub mod ownership;
pub mod reconcilers;
pub mod store;
pub mod telemetry;

#[cfg(test)]
mod crd_tests;
