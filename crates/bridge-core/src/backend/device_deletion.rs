//! Device deletion handling (spec.md §4.1 `processDeviceDeletions`, §5
//! cancellation entry points).

use crate::registry::EndpointRegistry;
use crate::subscriptions::SubscriptionManager;

/// Tear down every named endpoint: drop its subscriptions, remove the
/// registry entry, and forget its creation lock. Per-device MQTT sessions
/// and credential refreshers are owned by `bridge-peers`/`bridge-credentials`
/// — the caller tears those down using the returned names before or after
/// calling this, order doesn't matter since this function only touches the
/// structures `bridge-core` owns.
pub async fn process_device_deletions(
    registry: &EndpointRegistry,
    subscriptions: &SubscriptionManager,
    ep_names: &[String],
) -> Vec<String> {
    let mut deleted = Vec::with_capacity(ep_names.len());
    for ep in ep_names {
        subscriptions.remove_for_endpoint(ep).await;
        registry.remove(ep).await;
        registry.forget_creation_lock(ep).await;
        deleted.push(ep.clone());
    }
    deleted
}
