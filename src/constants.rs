// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the generator operator.
//!
//! Image tags, ports, environment values and volume names used by the
//! resource builders are compile-time constants: the custom resources carry
//! no spec fields, so every child object is derived from identity alone.

// ============================================================================
// API Constants
// ============================================================================

/// API group for all operator CRDs
pub const API_GROUP: &str = "managed.openshift.io";

/// API version for all operator CRDs
pub const API_VERSION: &str = "v1alpha1";

/// Kind name for `Generator` resource
pub const KIND_GENERATOR: &str = "Generator";

/// Kind name for `Proxy` resource
pub const KIND_PROXY: &str = "Proxy";

/// Kind name for `ProxyService` resource
pub const KIND_PROXY_SERVICE: &str = "ProxyService";

/// Field manager recorded on every object this operator creates
pub const FIELD_MANAGER: &str = "generator-operator";

// ============================================================================
// Scheduling
// ============================================================================

/// Node label restricting workloads to control-plane nodes
pub const CONTROL_PLANE_NODE_LABEL: &str = "node-role.kubernetes.io/master";

/// Toleration operator that matches every taint
pub const TOLERATION_OPERATOR_EXISTS: &str = "Exists";

/// UID the privileged containers run as
pub const ROOT_UID: i64 = 0;

// ============================================================================
// Generator workload
// ============================================================================

/// Pod selector label value for generator pods
pub const GENERATOR_APP_LABEL: &str = "generator";

/// Generator container image
pub const GENERATOR_IMAGE: &str = "quay.io/dedgar/generator:v0.0.1";

/// Generator container and port name
pub const GENERATOR_CONTAINER_NAME: &str = "generator";

/// Secret volume (and secret) name mounted into generator pods
pub const GENERATOR_SECRETS_VOLUME: &str = "generator-secrets";

// ============================================================================
// Proxy workload
// ============================================================================

/// Pod selector label value for proxy pods
pub const PROXY_APP_LABEL: &str = "Proxy";

/// Proxy container image
pub const PROXY_IMAGE: &str = "quay.io/dedgar/pod-Proxy:v0.0.10";

/// Proxy container and port name
pub const PROXY_CONTAINER_NAME: &str = "proxy";

/// Secret volume (and secret) name mounted into proxy pods
pub const PROXY_SECRETS_VOLUME: &str = "proxy-secrets";

/// Host log directory volume name
pub const HOST_LOGS_VOLUME: &str = "host-logs";

/// Host directory exposed to proxy pods
pub const HOST_LOG_PATH: &str = "/var/log/";

/// Mount point of the host log directory inside proxy pods
pub const HOST_LOG_MOUNT_PATH: &str = "/host/var/log/";

/// In-cluster endpoint proxy pods post log entries to
pub const PROXY_LOG_WRITER_URL: &str =
    "http://Proxy.openshift-traffic-gen-operator.svc:8080/api/log";

/// Host file the proxy writes scan results to
pub const PROXY_SCAN_LOG_FILE: &str = "/host/var/log/openshift_managed_malware_scan.log";

/// Host file the proxy writes pod-creation events to
pub const PROXY_POD_LOG_FILE: &str = "/host/var/log/openshift_managed_pod_creation.log";

// ============================================================================
// Shared container settings
// ============================================================================

/// Port every workload container listens on, and the service port
pub const CONTAINER_PORT: i32 = 8080;

/// Mount point for secret volumes
pub const SECRETS_MOUNT_PATH: &str = "/secrets";

/// Environment variable controlling the startup pause
pub const ENV_PAUSE_ON_START: &str = "OO_PAUSE_ON_START";

/// Environment variable holding the log callback URL
pub const ENV_LOG_WRITER_URL: &str = "LOG_WRITER_URL";

/// Environment variable holding the scan log path
pub const ENV_SCAN_LOG_FILE: &str = "SCAN_LOG_FILE";

/// Environment variable holding the pod-creation log path
pub const ENV_POD_LOG_FILE: &str = "POD_LOG_FILE";

// ============================================================================
// Runtime defaults
// ============================================================================

/// Default number of concurrent reconciles per controller
pub const DEFAULT_RECONCILE_CONCURRENCY: u16 = 4;

/// Default metrics listen address
pub const DEFAULT_METRICS_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default health probe listen address
pub const DEFAULT_HEALTH_PROBE_BIND_ADDRESS: &str = "0.0.0.0:8081";

/// Number of tokio worker threads in the manager runtime
pub const TOKIO_WORKER_THREADS: usize = 4;
