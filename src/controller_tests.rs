// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `controller.rs`

#[cfg(test)]
mod tests {
    use crate::controller::{error_policy, observe_result, reconcile, Context, RunResult};
    use crate::crd::{ProxyService, ProxyServiceSpec};
    use crate::key::ReconcileKey;
    use crate::reconcilers::retry::{default_backoff, ExponentialBackoff};
    use crate::store::memory::{InMemoryStore, StoreOperation};
    use k8s_openapi::api::core::v1::Service;
    use kube::runtime::controller::{self, Action};
    use kube::runtime::reflector::ObjectRef;
    use std::sync::Arc;
    use std::time::Duration;

    fn context(store: InMemoryStore) -> Arc<Context<InMemoryStore>> {
        let backoff = ExponentialBackoff {
            randomization_factor: 0.0,
            ..default_backoff()
        };
        Arc::new(Context::with_backoff(store, backoff))
    }

    fn seed(store: &InMemoryStore) -> Arc<ProxyService> {
        let mut svc = ProxyService::new("edge-svc", ProxyServiceSpec::default());
        svc.metadata.namespace = Some("ops".into());
        Arc::new(store.insert(svc))
    }

    #[tokio::test]
    async fn test_success_waits_for_change() {
        let store = InMemoryStore::new();
        let object = seed(&store);
        let ctx = context(store.clone());

        let action = reconcile(object, ctx).await.unwrap();

        assert_eq!(action, Action::await_change());
        assert!(store.fetch::<Service>("ops", "edge-svc").is_some());
    }

    #[tokio::test]
    async fn test_failures_back_off_then_reset() {
        let store = InMemoryStore::new();
        let object = seed(&store);
        let ctx = context(store.clone());
        let key = ReconcileKey::new("ops", "edge-svc");

        store.fail_next::<Service>(StoreOperation::Create, 503, "ServiceUnavailable");
        store.fail_next::<Service>(StoreOperation::Create, 503, "ServiceUnavailable");

        let err = reconcile(object.clone(), ctx.clone()).await.unwrap_err();
        assert_eq!(
            error_policy(object.clone(), &err, ctx.clone()),
            Action::requeue(Duration::from_secs(1))
        );

        let err = reconcile(object.clone(), ctx.clone()).await.unwrap_err();
        assert_eq!(
            error_policy(object.clone(), &err, ctx.clone()),
            Action::requeue(Duration::from_secs(2))
        );
        assert_eq!(ctx.retries.get(&key), 2);

        reconcile(object, ctx.clone()).await.unwrap();
        assert_eq!(ctx.retries.get(&key), 0);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_retried() {
        let store = InMemoryStore::new();
        let object = seed(&store);
        let ctx = context(store.clone());

        store.fail_next::<Service>(StoreOperation::Create, 403, "Forbidden");

        let err = reconcile(object.clone(), ctx.clone()).await.unwrap_err();
        assert_eq!(
            error_policy(object, &err, ctx),
            Action::requeue(Duration::from_secs(1))
        );
    }

    #[tokio::test]
    async fn test_deleted_owner_leaves_retry_state() {
        let store = InMemoryStore::new();
        let object = seed(&store);
        let ctx = context(store.clone());
        let key = ReconcileKey::new("ops", "edge-svc");

        store.fail_next::<Service>(StoreOperation::Create, 503, "ServiceUnavailable");
        let err = reconcile(object.clone(), ctx.clone()).await.unwrap_err();
        error_policy(object, &err, ctx.clone());
        assert!(ctx.retries.contains(&key));

        assert!(store.remove::<ProxyService>("ops", "edge-svc"));
        let result: RunResult<ProxyService> = Err(controller::Error::ObjectNotFound(
            ObjectRef::<ProxyService>::new("edge-svc").within("ops").erase(),
        ));
        observe_result::<ProxyService, InMemoryStore>(&ctx, &result);

        assert!(!ctx.retries.contains(&key));
        assert!(ctx.retries.is_empty());
    }

    #[tokio::test]
    async fn test_owner_missing_clears_retry_state() {
        let store = InMemoryStore::new();
        let object = seed(&store);
        let ctx = context(store.clone());
        let key = ReconcileKey::new("ops", "edge-svc");

        store.fail_next::<Service>(StoreOperation::Create, 503, "ServiceUnavailable");
        let err = reconcile(object.clone(), ctx.clone()).await.unwrap_err();
        error_policy(object.clone(), &err, ctx.clone());

        assert!(store.remove::<ProxyService>("ops", "edge-svc"));
        reconcile(object, ctx.clone()).await.unwrap();

        assert!(!ctx.retries.contains(&key));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_other_results_keep_retry_state() {
        let ctx = context(InMemoryStore::new());
        let key = ReconcileKey::new("ops", "edge-svc");
        ctx.retries.increment(&key);

        let object_ref = ObjectRef::<ProxyService>::new("edge-svc").within("ops");
        let result: RunResult<ProxyService> = Ok((object_ref, Action::await_change()));
        observe_result::<ProxyService, InMemoryStore>(&ctx, &result);

        assert_eq!(ctx.retries.get(&key), 1);
    }
}
