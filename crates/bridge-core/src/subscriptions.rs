//! Subscription manager — tracks which `(domain, ep, ept, path)` tuples the
//! backend is observing on behalf of a peer cloud (spec.md §3, §4.1).

use std::collections::HashMap;

use bridge_protocol::SubscriptionKey;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct SubscriptionManager {
    entries: RwLock<HashMap<SubscriptionKey, bool>>,
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, key: &SubscriptionKey) -> bool {
        self.entries.read().await.contains_key(key)
    }

    pub async fn observable(&self, key: &SubscriptionKey) -> Option<bool> {
        self.entries.read().await.get(key).copied()
    }

    /// Insert or refresh the observable flag for `key` (spec.md §4.1
    /// `processRegistration`: "refreshes the subscription-manager entry
    /// with the observable flag" regardless of whether it pre-existed).
    pub async fn upsert(&self, key: SubscriptionKey, observable: bool) {
        self.entries.write().await.insert(key, observable);
    }

    pub async fn remove(&self, key: &SubscriptionKey) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Remove every subscription recorded for `ep_name`, returning the
    /// resource paths that were dropped (used by `unsubscribe`/deletion).
    pub async fn remove_for_endpoint(&self, ep_name: &str) -> Vec<String> {
        let mut entries = self.entries.write().await;
        let removed: Vec<SubscriptionKey> = entries
            .keys()
            .filter(|k| k.ep_name == ep_name)
            .cloned()
            .collect();
        for key in &removed {
            entries.remove(key);
        }
        removed.into_iter().map(|k| k.resource_path).collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
