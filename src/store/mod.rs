// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Read and create access to namespaced objects.
//!
//! Reconcilers never talk to [`kube::Api`] directly. They go through an
//! [`ObjectStore`], which only offers the two operations the operator needs:
//! fetch by `(namespace, name)` and create. There is no update or
//! delete: children are never modified once they exist.
//!
//! - [`KubeStore`] is the production store backed by a [`kube::Client`].
//! - [`memory::InMemoryStore`] keeps objects in a map and is used by tests.

pub mod memory;

use crate::constants::FIELD_MANAGER;
use async_trait::async_trait;
use kube::api::PostParams;
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use tracing::debug;

pub use memory::InMemoryStore;

/// Namespaced object types a store can read and create.
pub trait StoredResource:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

impl<K> StoredResource for K where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static
{
}

/// Platform API capability used by the reconcilers.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetches `namespace/name`.
    ///
    /// Returns `Ok(None)` when the object does not exist.
    ///
    /// # Errors
    ///
    /// Any API failure other than not-found.
    async fn get<K: StoredResource>(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<K>, kube::Error>;

    /// Creates `object` in its own namespace and returns the stored copy.
    ///
    /// # Errors
    ///
    /// Any API failure, including HTTP 409 when the object already exists.
    async fn create<K: StoredResource>(&self, object: &K) -> Result<K, kube::Error>;
}

/// [`ObjectStore`] backed by the Kubernetes API server.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for KubeStore {
    async fn get<K: StoredResource>(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<K>, kube::Error> {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        api.get_opt(name).await
    }

    async fn create<K: StoredResource>(&self, object: &K) -> Result<K, kube::Error> {
        let namespace = object.namespace().unwrap_or_default();
        let api: Api<K> = Api::namespaced(self.client.clone(), &namespace);

        debug!(
            namespace = %namespace,
            name = %object.name_any(),
            kind = %K::kind(&()),
            "Creating resource"
        );

        let params = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };
        api.create(&params, object).await
    }
}
