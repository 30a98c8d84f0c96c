//! Deregistration handling (spec.md §4.1 `processDeregistrations`).

use crate::subscriptions::SubscriptionManager;

/// Clear subscriptions for every deregistered endpoint. Returns the subset
/// that should also be deleted when the "delete-on-deregistration" policy
/// is enabled — the caller (the generic processor) drives the actual
/// deletion via `device_deletion::process_device_deletions`, since deletion
/// additionally tears down MQTT sessions and credential refreshers that
/// this module doesn't own.
pub async fn process_deregistrations(
    subscriptions: &SubscriptionManager,
    ep_names: &[String],
    delete_on_deregistration: bool,
) -> Vec<String> {
    for ep in ep_names {
        subscriptions.remove_for_endpoint(ep).await;
    }
    if delete_on_deregistration {
        ep_names.to_vec()
    } else {
        Vec::new()
    }
}
