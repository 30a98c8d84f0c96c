//! Re-registration handling (spec.md §4.1 `processReRegistration`).

use bridge_protocol::RegistrationEntry;

use crate::registry::EndpointRegistry;

/// For each `reg-updates` entry, decide whether it needs full registration
/// processing: if the endpoint has no resource subscriptions recorded yet,
/// treat it as new; otherwise it's a no-op refresh the backend already
/// knows about.
pub async fn entries_needing_full_registration(
    registry: &EndpointRegistry,
    entries: &[RegistrationEntry],
) -> Vec<RegistrationEntry> {
    let mut needing = Vec::new();
    for entry in entries {
        let needs_full = match registry.get(&entry.ep).await {
            Some(ep) => ep.subscribed_paths.is_empty(),
            None => true,
        };
        if needs_full {
            needing.push(entry.clone());
        }
    }
    needing
}
