// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes resource builders for the operator's custom resources.
//!
//! This module maps a custom resource to the child objects it should own:
//!
//! - [`Generator`] → privileged generator `DaemonSet`
//! - [`Proxy`] → privileged proxy `DaemonSet` with the host log directory mounted
//! - [`ProxyService`] → `Service` selecting the proxy pods
//!
//! All functions are pure and deterministic: the output depends only on the
//! instance's name and namespace. Owner references are not set here; see
//! [`crate::ownership`].

use crate::constants::{
    CONTAINER_PORT, CONTROL_PLANE_NODE_LABEL, ENV_LOG_WRITER_URL, ENV_PAUSE_ON_START,
    ENV_POD_LOG_FILE, ENV_SCAN_LOG_FILE, GENERATOR_APP_LABEL, GENERATOR_CONTAINER_NAME,
    GENERATOR_IMAGE, GENERATOR_SECRETS_VOLUME, HOST_LOGS_VOLUME, HOST_LOG_MOUNT_PATH,
    HOST_LOG_PATH, PROXY_APP_LABEL, PROXY_CONTAINER_NAME, PROXY_IMAGE, PROXY_LOG_WRITER_URL,
    PROXY_POD_LOG_FILE, PROXY_SCAN_LOG_FILE, PROXY_SECRETS_VOLUME, ROOT_UID,
    SECRETS_MOUNT_PATH, TOLERATION_OPERATOR_EXISTS,
};
use crate::crd::{Generator, Proxy, ProxyService};
use crate::labels::{child_labels, selector_labels, SELECTOR_NAME, SERVICE_K8S_APP};
use k8s_openapi::api::{
    apps::v1::{DaemonSet, DaemonSetSpec},
    core::v1::{
        Container, ContainerPort, EnvVar, HostPathVolumeSource, PodSpec, PodTemplateSpec,
        SecretVolumeSource, SecurityContext, Service, ServicePort, ServiceSpec, Toleration,
        Volume, VolumeMount,
    },
};
use k8s_openapi::apimachinery::pkg::{
    apis::meta::v1::{LabelSelector, ObjectMeta},
    util::intstr::IntOrString,
};
use kube::ResourceExt;
use std::collections::BTreeMap;
use tracing::debug;

/// Value of the startup-pause environment variable; pods start immediately.
const PAUSE_ON_START_DISABLED: &str = "false";

/// Builds the generator `DaemonSet` for a `Generator` instance.
///
/// The `DaemonSet` is named after the instance, runs one privileged
/// `generator` pod per control-plane node, exposes container port 8080 and
/// mounts the `generator-secrets` secret at `/secrets`.
///
/// # Example
///
/// ```rust
/// use generator_operator::builders::build_generator_daemonset;
/// use generator_operator::crd::{Generator, GeneratorSpec};
///
/// let mut generator = Generator::new("generator", GeneratorSpec::default());
/// generator.metadata.namespace = Some("ops".into());
///
/// let ds = build_generator_daemonset(&generator);
/// assert_eq!(ds.metadata.name.as_deref(), Some("generator"));
/// assert_eq!(ds.metadata.namespace.as_deref(), Some("ops"));
/// ```
#[must_use]
pub fn build_generator_daemonset(generator: &Generator) -> DaemonSet {
    let name = generator.name_any();
    let namespace = generator.namespace().unwrap_or_default();

    debug!(name = %name, namespace = %namespace, "Building DaemonSet for Generator");

    let container = build_privileged_container(
        GENERATOR_CONTAINER_NAME,
        GENERATOR_IMAGE,
        vec![env_var(ENV_PAUSE_ON_START, PAUSE_ON_START_DISABLED)],
        vec![VolumeMount {
            name: GENERATOR_SECRETS_VOLUME.into(),
            mount_path: SECRETS_MOUNT_PATH.into(),
            ..Default::default()
        }],
    );

    build_control_plane_daemonset(
        &name,
        &namespace,
        GENERATOR_APP_LABEL,
        container,
        vec![secret_volume(GENERATOR_SECRETS_VOLUME)],
    )
}

/// Builds the proxy `DaemonSet` for a `Proxy` instance.
///
/// Compared to the generator, the proxy container also receives the log
/// callback URL and the two host log-file paths, and mounts the host's
/// `/var/log/` at `/host/var/log/`.
#[must_use]
pub fn build_proxy_daemonset(proxy: &Proxy) -> DaemonSet {
    let name = proxy.name_any();
    let namespace = proxy.namespace().unwrap_or_default();

    debug!(name = %name, namespace = %namespace, "Building DaemonSet for Proxy");

    let container = build_privileged_container(
        PROXY_CONTAINER_NAME,
        PROXY_IMAGE,
        vec![
            env_var(ENV_PAUSE_ON_START, PAUSE_ON_START_DISABLED),
            env_var(ENV_LOG_WRITER_URL, PROXY_LOG_WRITER_URL),
            env_var(ENV_SCAN_LOG_FILE, PROXY_SCAN_LOG_FILE),
            env_var(ENV_POD_LOG_FILE, PROXY_POD_LOG_FILE),
        ],
        vec![
            VolumeMount {
                name: PROXY_SECRETS_VOLUME.into(),
                mount_path: SECRETS_MOUNT_PATH.into(),
                ..Default::default()
            },
            VolumeMount {
                name: HOST_LOGS_VOLUME.into(),
                mount_path: HOST_LOG_MOUNT_PATH.into(),
                ..Default::default()
            },
        ],
    );

    let volumes = vec![
        secret_volume(PROXY_SECRETS_VOLUME),
        Volume {
            name: HOST_LOGS_VOLUME.into(),
            host_path: Some(HostPathVolumeSource {
                path: HOST_LOG_PATH.into(),
                ..Default::default()
            }),
            ..Default::default()
        },
    ];

    build_control_plane_daemonset(&name, &namespace, PROXY_APP_LABEL, container, volumes)
}

/// Builds the `Service` for a `ProxyService` instance.
///
/// The Service is labelled with the instance name (`name` and `k8s-app`),
/// selects pods labelled `name: Proxy`, and maps port 8080 to container
/// port 8080. The single port is named after the instance.
///
/// # Example
///
/// ```rust
/// use generator_operator::builders::build_proxy_service;
/// use generator_operator::crd::{ProxyService, ProxyServiceSpec};
///
/// let mut svc = ProxyService::new("edge-svc", ProxyServiceSpec::default());
/// svc.metadata.namespace = Some("ops".into());
///
/// let service = build_proxy_service(&svc);
/// let selector = service.spec.unwrap().selector.unwrap();
/// assert_eq!(selector.get("name").map(String::as_str), Some("Proxy"));
/// ```
#[must_use]
pub fn build_proxy_service(proxy_service: &ProxyService) -> Service {
    let name = proxy_service.name_any();
    let namespace = proxy_service.namespace().unwrap_or_default();

    debug!(name = %name, namespace = %namespace, "Building Service for ProxyService");

    let mut labels = child_labels(PROXY_APP_LABEL, &name);
    labels.insert(SELECTOR_NAME.into(), name.clone());
    labels.insert(SERVICE_K8S_APP.into(), name.clone());

    Service {
        metadata: ObjectMeta {
            name: Some(name.clone()),
            namespace: Some(namespace),
            labels: Some(labels),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            selector: Some(selector_labels(PROXY_APP_LABEL)),
            ports: Some(vec![ServicePort {
                name: Some(name),
                port: CONTAINER_PORT,
                target_port: Some(IntOrString::Int(CONTAINER_PORT)),
                protocol: Some("TCP".into()),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Wraps a container in a `DaemonSet` pinned to control-plane nodes.
///
/// Selector and pod template share the `name: <app>` label; object metadata
/// additionally carries the standard `app.kubernetes.io/*` labels.
fn build_control_plane_daemonset(
    name: &str,
    namespace: &str,
    app: &str,
    container: Container,
    volumes: Vec<Volume>,
) -> DaemonSet {
    let selector = selector_labels(app);

    DaemonSet {
        metadata: ObjectMeta {
            name: Some(name.into()),
            namespace: Some(namespace.into()),
            labels: Some(child_labels(app, name)),
            ..Default::default()
        },
        spec: Some(DaemonSetSpec {
            selector: LabelSelector {
                match_labels: Some(selector.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(selector),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    node_selector: Some(BTreeMap::from([(
                        CONTROL_PLANE_NODE_LABEL.to_string(),
                        String::new(),
                    )])),
                    tolerations: Some(vec![Toleration {
                        operator: Some(TOLERATION_OPERATOR_EXISTS.into()),
                        ..Default::default()
                    }]),
                    containers: vec![container],
                    volumes: Some(volumes),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Privileged container running as root with a single port 8080 named after it.
fn build_privileged_container(
    name: &str,
    image: &str,
    env: Vec<EnvVar>,
    volume_mounts: Vec<VolumeMount>,
) -> Container {
    Container {
        name: name.into(),
        image: Some(image.into()),
        security_context: Some(SecurityContext {
            privileged: Some(true),
            run_as_user: Some(ROOT_UID),
            ..Default::default()
        }),
        env: Some(env),
        ports: Some(vec![ContainerPort {
            name: Some(name.into()),
            container_port: CONTAINER_PORT,
            ..Default::default()
        }]),
        volume_mounts: Some(volume_mounts),
        ..Default::default()
    }
}

/// Volume backed by the secret of the same name.
fn secret_volume(name: &str) -> Volume {
    Volume {
        name: name.into(),
        secret: Some(SecretVolumeSource {
            secret_name: Some(name.into()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn env_var(name: &str, value: &str) -> EnvVar {
    EnvVar {
        name: name.into(),
        value: Some(value.into()),
        ..Default::default()
    }
}

#[cfg(test)]
#[path = "builders_tests.rs"]
mod builders_tests;
