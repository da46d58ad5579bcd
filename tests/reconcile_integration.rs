// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation behaviour against the in-memory store.
//!
//! Run with: cargo test --test reconcile_integration

use generator_operator::builders::build_proxy_daemonset;
use generator_operator::crd::{
    Generator, GeneratorSpec, Proxy, ProxyService, ProxyServiceSpec, ProxySpec,
};
use generator_operator::errors::{ErrorClass, ReconcileError};
use generator_operator::key::ReconcileKey;
use generator_operator::reconcilers::{reconcile_key, ReconcileOutcome};
use generator_operator::store::memory::{InMemoryStore, StoreOperation, WriteRecord};
use k8s_openapi::api::{apps::v1::DaemonSet, core::v1::Service};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

const NAMESPACE: &str = "ops";

fn seed_proxy(store: &InMemoryStore, name: &str) -> Proxy {
    let mut proxy = Proxy::new(name, ProxySpec::default());
    proxy.metadata.namespace = Some(NAMESPACE.into());
    store.insert(proxy)
}

fn seed_generator(store: &InMemoryStore, name: &str) -> Generator {
    let mut generator = Generator::new(name, GeneratorSpec::default());
    generator.metadata.namespace = Some(NAMESPACE.into());
    store.insert(generator)
}

fn seed_proxy_service(store: &InMemoryStore, name: &str) -> ProxyService {
    let mut svc = ProxyService::new(name, ProxyServiceSpec::default());
    svc.metadata.namespace = Some(NAMESPACE.into());
    store.insert(svc)
}

fn key(name: &str) -> ReconcileKey {
    ReconcileKey::new(NAMESPACE, name)
}

// ============================================================================
// Scenarios
// ============================================================================

/// A new Proxy gets its DaemonSet with the proxy image and both volumes
#[tokio::test]
async fn test_proxy_creates_daemonset() {
    let store = InMemoryStore::new();
    let proxy = seed_proxy(&store, "edge");

    reconcile_key::<Proxy, _>(&store, &key("edge")).await.unwrap();

    let ds = store
        .fetch::<DaemonSet>(NAMESPACE, "edge")
        .expect("DaemonSet should be created");
    assert_eq!(ds.metadata.name.as_deref(), Some("edge"));
    assert_eq!(ds.metadata.namespace.as_deref(), Some(NAMESPACE));

    let pod = ds.spec.unwrap().template.spec.unwrap();
    assert_eq!(
        pod.containers[0].image.as_deref(),
        Some("quay.io/dedgar/pod-Proxy:v0.0.10")
    );

    let volumes = pod.volumes.unwrap();
    assert_eq!(volumes.len(), 2);
    assert!(volumes.iter().any(|v| v.secret.is_some()));
    assert!(volumes
        .iter()
        .any(|v| v.host_path.as_ref().is_some_and(|hp| hp.path == "/var/log/")));

    let owner = &ds.metadata.owner_references.unwrap()[0];
    assert_eq!(owner.kind, "Proxy");
    assert_eq!(Some(owner.uid.clone()), proxy.metadata.uid);
}

/// Reconciling the same key again creates nothing
#[tokio::test]
async fn test_second_reconcile_is_a_no_op() {
    let store = InMemoryStore::new();
    seed_proxy(&store, "edge");

    reconcile_key::<Proxy, _>(&store, &key("edge")).await.unwrap();
    let first = store.fetch::<DaemonSet>(NAMESPACE, "edge");

    let outcome = reconcile_key::<Proxy, _>(&store, &key("edge")).await.unwrap();

    assert!(matches!(
        outcome,
        ReconcileOutcome::Reconciled { ref created, ref existing }
            if created.is_empty() && existing.len() == 1
    ));
    assert_eq!(store.write_count(), 1);
    assert_eq!(store.fetch::<DaemonSet>(NAMESPACE, "edge"), first);
}

/// A new ProxyService gets a Service on port 8080 selecting the proxy pods
#[tokio::test]
async fn test_proxy_service_creates_service() {
    let store = InMemoryStore::new();
    seed_proxy_service(&store, "edge-svc");

    reconcile_key::<ProxyService, _>(&store, &key("edge-svc"))
        .await
        .unwrap();

    let service = store
        .fetch::<Service>(NAMESPACE, "edge-svc")
        .expect("Service should be created");
    let spec = service.spec.unwrap();
    assert_eq!(spec.selector.unwrap().get("name").map(String::as_str), Some("Proxy"));

    let ports = spec.ports.unwrap();
    assert_eq!(ports.len(), 1);
    assert_eq!(ports[0].port, 8080);
    assert_eq!(ports[0].target_port, Some(IntOrString::Int(8080)));

    assert_eq!(
        store.writes(),
        vec![WriteRecord {
            kind: "Service".into(),
            namespace: NAMESPACE.into(),
            name: "edge-svc".into(),
        }]
    );
}

/// An instance deleted before the reconcile runs leads to no writes
#[tokio::test]
async fn test_deleted_instance_is_a_no_op() {
    let store = InMemoryStore::new();
    seed_proxy(&store, "edge");
    assert!(store.remove::<Proxy>(NAMESPACE, "edge"));

    let outcome = reconcile_key::<Proxy, _>(&store, &key("edge")).await.unwrap();

    assert_eq!(outcome, ReconcileOutcome::OwnerMissing);
    assert_eq!(store.write_count(), 0);
}

// ============================================================================
// Properties
// ============================================================================

/// Children are named after their instance, in its namespace, for every kind
#[tokio::test]
async fn test_child_names_follow_instance() {
    let store = InMemoryStore::new();
    for name in ["a", "generator", "traffic-gen-01"] {
        seed_generator(&store, name);
        seed_proxy(&store, &format!("{name}-proxy"));
        seed_proxy_service(&store, &format!("{name}-svc"));

        reconcile_key::<Generator, _>(&store, &key(name)).await.unwrap();
        reconcile_key::<Proxy, _>(&store, &key(&format!("{name}-proxy")))
            .await
            .unwrap();
        reconcile_key::<ProxyService, _>(&store, &key(&format!("{name}-svc")))
            .await
            .unwrap();
    }

    for write in store.writes() {
        assert_eq!(write.namespace, NAMESPACE);
    }
    assert!(store.fetch::<DaemonSet>(NAMESPACE, "traffic-gen-01").is_some());
    assert!(store.fetch::<DaemonSet>(NAMESPACE, "traffic-gen-01-proxy").is_some());
    assert!(store.fetch::<Service>(NAMESPACE, "traffic-gen-01-svc").is_some());
    assert_eq!(store.write_count(), 9);
}

/// An existing child that differs from the desired one is left unchanged
#[tokio::test]
async fn test_existing_child_is_never_modified() {
    let store = InMemoryStore::new();
    let proxy = seed_proxy(&store, "edge");

    let mut drifted = build_proxy_daemonset(&proxy);
    if let Some(pod) = drifted.spec.as_mut().and_then(|s| s.template.spec.as_mut()) {
        pod.containers[0].image = Some("example.com/stale:old".into());
        pod.volumes = None;
    }
    let drifted = store.insert(drifted);

    reconcile_key::<Proxy, _>(&store, &key("edge")).await.unwrap();

    assert_eq!(store.fetch::<DaemonSet>(NAMESPACE, "edge"), Some(drifted));
    assert_eq!(store.write_count(), 0);
}

/// A child deleted out of band is recreated on the next reconcile
#[tokio::test]
async fn test_deleted_child_is_recreated() {
    let store = InMemoryStore::new();
    seed_proxy_service(&store, "edge-svc");

    reconcile_key::<ProxyService, _>(&store, &key("edge-svc"))
        .await
        .unwrap();
    assert!(store.remove::<Service>(NAMESPACE, "edge-svc"));

    reconcile_key::<ProxyService, _>(&store, &key("edge-svc"))
        .await
        .unwrap();

    assert!(store.fetch::<Service>(NAMESPACE, "edge-svc").is_some());
    assert_eq!(store.write_count(), 2);
}

/// A transient failure surfaces as an error and the retry succeeds
#[tokio::test]
async fn test_transient_failure_then_retry() {
    let store = InMemoryStore::new();
    seed_generator(&store, "gen");
    store.fail_next::<DaemonSet>(StoreOperation::Create, 429, "TooManyRequests");

    let err = reconcile_key::<Generator, _>(&store, &key("gen"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::CreateChild { .. }));
    assert_eq!(err.class(), ErrorClass::Transient);
    assert_eq!(store.write_count(), 0);

    reconcile_key::<Generator, _>(&store, &key("gen")).await.unwrap();
    assert_eq!(store.write_count(), 1);
}

/// Instances in different namespaces with the same name are independent
#[tokio::test]
async fn test_same_name_in_other_namespace() {
    let store = InMemoryStore::new();
    seed_proxy(&store, "edge");
    let mut other = Proxy::new("edge", ProxySpec::default());
    other.metadata.namespace = Some("dev".into());
    store.insert(other);

    reconcile_key::<Proxy, _>(&store, &key("edge")).await.unwrap();
    reconcile_key::<Proxy, _>(&store, &ReconcileKey::new("dev", "edge"))
        .await
        .unwrap();

    assert!(store.fetch::<DaemonSet>(NAMESPACE, "edge").is_some());
    assert!(store.fetch::<DaemonSet>("dev", "edge").is_some());
    assert_eq!(store.write_count(), 2);
}
