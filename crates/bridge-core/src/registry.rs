//! Endpoint registry — the in-memory device → shadow map (spec.md §3, §5).
//!
//! One of the three shared mutable structures named in spec.md §5; the
//! other two (MQTT-session map, credential-refresh-timer map) are owned by
//! `bridge-peers` and `bridge-credentials` respectively, since their entry
//! shapes are cloud-specific.

use std::collections::HashMap;
use std::sync::Arc;

use bridge_protocol::Endpoint;
use tokio::sync::{Mutex, RwLock};

/// Endpoint map plus per-`ep_name` creation locks.
///
/// `createAndStartMQTTForEndpoint` / `validateMQTTConnection` (spec.md §5)
/// must be serialized per endpoint so two concurrent registrations for the
/// same `ep_name` produce a single session. `creation_lock` hands out a
/// per-key `tokio::sync::Mutex` the caller holds across that whole
/// check-then-create sequence.
#[derive(Default)]
pub struct EndpointRegistry {
    endpoints: RwLock<HashMap<String, Endpoint>>,
    creation_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, ep_name: &str) -> Option<Endpoint> {
        self.endpoints.read().await.get(ep_name).cloned()
    }

    pub async fn contains(&self, ep_name: &str) -> bool {
        self.endpoints.read().await.contains_key(ep_name)
    }

    pub async fn insert(&self, endpoint: Endpoint) {
        self.endpoints
            .write()
            .await
            .insert(endpoint.ep_name.clone(), endpoint);
    }

    /// Remove the endpoint entry. Idempotent — returns `None` if it was
    /// already absent, never an error (spec.md §4.1 `unsubscribe`).
    pub async fn remove(&self, ep_name: &str) -> Option<Endpoint> {
        self.endpoints.write().await.remove(ep_name)
    }

    pub async fn len(&self) -> usize {
        self.endpoints.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.endpoints.read().await.is_empty()
    }

    pub async fn mutate<F>(&self, ep_name: &str, f: F) -> bool
    where
        F: FnOnce(&mut Endpoint),
    {
        let mut guard = self.endpoints.write().await;
        match guard.get_mut(ep_name) {
            Some(ep) => {
                f(ep);
                true
            }
            None => false,
        }
    }

    /// Return the per-endpoint creation lock, creating it if this is the
    /// first caller to ask for `ep_name`. Callers hold the returned mutex
    /// for the duration of session creation, not just the map lookup.
    pub async fn creation_lock(&self, ep_name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.creation_locks.lock().await;
        locks
            .entry(ep_name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the creation lock entry once an endpoint is torn down, so the
    /// lock map doesn't grow unbounded over the life of the process.
    pub async fn forget_creation_lock(&self, ep_name: &str) {
        self.creation_locks.lock().await.remove(ep_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_and_get_roundtrip() {
        let registry = EndpointRegistry::new();
        registry.insert(Endpoint::new("d1", "light")).await;
        assert!(registry.contains("d1").await);
        assert_eq!(registry.get("d1").await.unwrap().ep_type, "light");
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let registry = EndpointRegistry::new();
        registry.insert(Endpoint::new("d1", "light")).await;
        assert!(registry.remove("d1").await.is_some());
        assert!(registry.remove("d1").await.is_none());
    }

    #[tokio::test]
    async fn creation_lock_is_shared_across_callers_for_same_key() {
        let registry = EndpointRegistry::new();
        let lock_a = registry.creation_lock("d1").await;
        let lock_b = registry.creation_lock("d1").await;
        assert!(Arc::ptr_eq(&lock_a, &lock_b));
    }

    #[tokio::test]
    async fn creation_lock_serializes_concurrent_callers() {
        let registry = Arc::new(EndpointRegistry::new());
        let lock = registry.creation_lock("d1").await;
        let _guard = lock.lock().await;

        let registry2 = registry.clone();
        let waiter = tokio::spawn(async move {
            let lock2 = registry2.creation_lock("d1").await;
            // Should block until the outer guard drops.
            let _g = lock2.lock().await;
        });

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());
        drop(_guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn mutate_updates_existing_endpoint_only() {
        let registry = EndpointRegistry::new();
        registry.insert(Endpoint::new("d1", "light")).await;
        assert!(
            registry
                .mutate("d1", |ep| {
                    ep.subscribed_paths.insert("/3303/0/5700".into());
                })
                .await
        );
        assert!(!registry.mutate("missing", |_| {}).await);
        assert!(
            registry
                .get("d1")
                .await
                .unwrap()
                .subscribed_paths
                .contains("/3303/0/5700")
        );
    }
}
