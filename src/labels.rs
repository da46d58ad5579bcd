// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label keys and values stamped on child objects.
//!
//! Selector labels (`name`) are part of the pod contract and must stay exactly
//! as declared; the `app.kubernetes.io/*` labels are informational metadata.

use std::collections::BTreeMap;

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the name of the application
pub const K8S_NAME: &str = "app.kubernetes.io/name";

/// Standard label for a unique name identifying the instance of an application
pub const K8S_INSTANCE: &str = "app.kubernetes.io/instance";

/// Standard label for the tool being used to manage the operation of an application
pub const K8S_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Standard label for the name of a higher-level application this one is part of
pub const K8S_PART_OF: &str = "app.kubernetes.io/part-of";

/// Value for `app.kubernetes.io/managed-by`
pub const MANAGED_BY_OPERATOR: &str = "generator-operator";

/// Value for `app.kubernetes.io/part-of`
pub const PART_OF_TRAFFIC_GENERATOR: &str = "traffic-generator";

// ============================================================================
// Selector and service labels
// ============================================================================

/// Pod selector label key
pub const SELECTOR_NAME: &str = "name";

/// Service label carrying the owning instance name
pub const SERVICE_K8S_APP: &str = "k8s-app";

/// Selector labels matching the pods of one application.
#[must_use]
pub fn selector_labels(app: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(SELECTOR_NAME.to_string(), app.to_string())])
}

/// Longest value the API server accepts for a label
pub const MAX_LABEL_VALUE_LEN: usize = 63;

/// Metadata labels for a child object created on behalf of `instance_name`.
///
/// Object names may run to 253 characters, so the instance label is left off
/// when the name does not fit in a label value.
#[must_use]
pub fn child_labels(app: &str, instance_name: &str) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(K8S_NAME.into(), app.to_lowercase());
    if instance_name.len() <= MAX_LABEL_VALUE_LEN {
        labels.insert(K8S_INSTANCE.into(), instance_name.into());
    }
    labels.insert(K8S_MANAGED_BY.into(), MANAGED_BY_OPERATOR.into());
    labels.insert(K8S_PART_OF.into(), PART_OF_TRAFFIC_GENERATOR.into());
    labels
}
