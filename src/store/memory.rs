// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory [`ObjectStore`] for tests.
//!
//! Objects are kept as JSON keyed by `(kind, namespace, name)`, so one store
//! holds custom resources and children side by side. The store mirrors the API
//! server where the reconcilers can observe it:
//!
//! - creates assign a UID and reject duplicates with `409 AlreadyExists`,
//! - a create without a name is rejected with `422 Invalid`,
//! - every successful create is recorded as a write.
//!
//! Failures can be injected per operation and kind with
//! [`InMemoryStore::fail_next`]; each injected failure is returned once.
//!
//! # Example
//!
//! ```rust
//! use generator_operator::crd::{Proxy, ProxySpec};
//! use generator_operator::store::InMemoryStore;
//!
//! let store = InMemoryStore::new();
//! let mut proxy = Proxy::new("edge", ProxySpec::default());
//! proxy.metadata.namespace = Some("ops".into());
//!
//! let stored = store.insert(proxy);
//! assert!(stored.metadata.uid.is_some());
//! assert_eq!(store.write_count(), 0);
//! ```

use super::{ObjectStore, StoredResource};
use async_trait::async_trait;
use kube::ResourceExt;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Store operation a failure can be injected into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Get,
    Create,
}

/// One successful create.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteRecord {
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct StoredKey {
    kind: String,
    namespace: String,
    name: String,
}

impl StoredKey {
    fn new<K: StoredResource>(namespace: &str, name: &str) -> Self {
        Self {
            kind: K::kind(&()).to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
struct InjectedFailure {
    code: u16,
    reason: String,
}

#[derive(Default)]
struct State {
    objects: BTreeMap<StoredKey, serde_json::Value>,
    writes: Vec<WriteRecord>,
    next_uid: u64,
    failures: HashMap<(StoreOperation, String), VecDeque<InjectedFailure>>,
}

impl State {
    fn assign_uid<K: StoredResource>(&mut self, object: &mut K) {
        self.next_uid += 1;
        let meta = object.meta_mut();
        meta.uid = Some(format!("uid-{}", self.next_uid));
        meta.resource_version = Some("1".to_string());
    }

    fn take_failure<K: StoredResource>(&mut self, op: StoreOperation) -> Option<kube::Error> {
        let failure = self
            .failures
            .get_mut(&(op, K::kind(&()).to_string()))?
            .pop_front()?;
        Some(api_error(
            failure.code,
            &failure.reason,
            &format!("injected {op:?} failure for {}", K::kind(&())),
        ))
    }
}

/// [`ObjectStore`] keeping objects in process memory.
///
/// Clones share the same underlying state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seeds `object`, assigning a UID if it has none. Not counted as a write.
    ///
    /// An existing object with the same key is replaced.
    ///
    /// # Panics
    ///
    /// If `object` cannot be serialized to JSON.
    pub fn insert<K: StoredResource>(&self, mut object: K) -> K {
        let mut state = self.lock();
        if object.meta().uid.is_none() {
            state.assign_uid(&mut object);
        }
        let key = StoredKey::new::<K>(&object.namespace().unwrap_or_default(), &object.name_any());
        let value = serde_json::to_value(&object).expect("seeded object serializes to JSON");
        state.objects.insert(key, value);
        object
    }

    /// Removes `namespace/name` of kind `K`, returning whether it existed.
    pub fn remove<K: StoredResource>(&self, namespace: &str, name: &str) -> bool {
        self.lock()
            .objects
            .remove(&StoredKey::new::<K>(namespace, name))
            .is_some()
    }

    /// Reads `namespace/name` without going through the failure injection.
    #[must_use]
    pub fn fetch<K: StoredResource>(&self, namespace: &str, name: &str) -> Option<K> {
        self.lock()
            .objects
            .get(&StoredKey::new::<K>(namespace, name))
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Number of stored objects of kind `K` across all namespaces.
    #[must_use]
    pub fn count<K: StoredResource>(&self) -> usize {
        let kind = K::kind(&());
        self.lock()
            .objects
            .keys()
            .filter(|key| key.kind == kind)
            .count()
    }

    /// Successful creates, in order.
    #[must_use]
    pub fn writes(&self) -> Vec<WriteRecord> {
        self.lock().writes.clone()
    }

    #[must_use]
    pub fn write_count(&self) -> usize {
        self.lock().writes.len()
    }

    /// Makes the next `op` on kind `K` fail with the given API status.
    ///
    /// Calls queue up: injecting twice fails the next two calls.
    pub fn fail_next<K: StoredResource>(&self, op: StoreOperation, code: u16, reason: &str) {
        self.lock()
            .failures
            .entry((op, K::kind(&()).to_string()))
            .or_default()
            .push_back(InjectedFailure {
                code,
                reason: reason.to_string(),
            });
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn get<K: StoredResource>(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<K>, kube::Error> {
        let mut state = self.lock();
        if let Some(err) = state.take_failure::<K>(StoreOperation::Get) {
            return Err(err);
        }

        state
            .objects
            .get(&StoredKey::new::<K>(namespace, name))
            .map(|value| serde_json::from_value(value.clone()).map_err(kube::Error::SerdeError))
            .transpose()
    }

    async fn create<K: StoredResource>(&self, object: &K) -> Result<K, kube::Error> {
        let mut state = self.lock();
        if let Some(err) = state.take_failure::<K>(StoreOperation::Create) {
            return Err(err);
        }

        let Some(name) = object.meta().name.clone() else {
            return Err(api_error(
                422,
                "Invalid",
                &format!("{}: metadata.name is required", K::kind(&())),
            ));
        };
        let namespace = object.namespace().unwrap_or_default();
        let key = StoredKey::new::<K>(&namespace, &name);

        if state.objects.contains_key(&key) {
            return Err(api_error(
                409,
                "AlreadyExists",
                &format!("{} \"{name}\" already exists", K::kind(&())),
            ));
        }

        let mut stored = object.clone();
        state.assign_uid(&mut stored);
        let value = serde_json::to_value(&stored).map_err(kube::Error::SerdeError)?;
        state.objects.insert(key.clone(), value);
        state.writes.push(WriteRecord {
            kind: key.kind,
            namespace,
            name,
        });

        Ok(stored)
    }
}

/// An API server failure status.
#[must_use]
pub fn api_error(code: u16, reason: &str, message: &str) -> kube::Error {
    kube::Error::Api(kube::core::Status::failure(message, reason).with_code(code).boxed())
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod memory_tests;
