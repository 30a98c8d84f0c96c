//! Registration handling (spec.md §4.1 `processRegistration`).

use bridge_protocol::{Endpoint, RegistrationEntry, SubscriptionKey};

use crate::hooks::PeerHooks;
use crate::orchestrator::Orchestrator;
use crate::registry::EndpointRegistry;
use crate::subscriptions::SubscriptionManager;

/// Process one batch of registrations (or re-registrations that fell
/// through to full processing). For each endpoint, creates the registry
/// entry if absent, then walks its resources: re-subscribes already-known
/// subscriptions, auto-subscribes new observable ones when enabled, and
/// always refreshes the subscription manager's observable flag. Returns the
/// endpoint names touched.
pub async fn process_registration<H: PeerHooks>(
    registry: &EndpointRegistry,
    subscriptions: &SubscriptionManager,
    orchestrator: &dyn Orchestrator,
    hooks: &H,
    domain: &str,
    entries: &[RegistrationEntry],
    auto_subscribe: bool,
) -> Vec<String> {
    let mut touched = Vec::with_capacity(entries.len());

    for entry in entries {
        if !registry.contains(&entry.ep).await {
            let mut endpoint = Endpoint::new(&entry.ep, &entry.ept);
            endpoint.topic_set = hooks.create_endpoint_topic_data(&entry.ep, &entry.ept);
            registry.insert(endpoint).await;
        }

        for resource in &entry.resources {
            let key = SubscriptionKey::new(domain, &entry.ep, &entry.ept, &resource.path);
            let known = subscriptions.contains(&key).await;

            if known || (resource.obs && auto_subscribe) {
                if orchestrator.subscribe_to_endpoint_resource(&key).await {
                    registry
                        .mutate(&entry.ep, |ep| {
                            ep.subscribed_paths.insert(resource.path.clone());
                        })
                        .await;
                } else {
                    tracing::warn!(
                        ep = %entry.ep,
                        path = %resource.path,
                        "backend rejected resource subscription"
                    );
                }
            }

            subscriptions.upsert(key, resource.obs).await;
        }

        orchestrator.pull_device_metadata(&entry.ep).await;
        touched.push(entry.ep.clone());
    }

    touched
}
