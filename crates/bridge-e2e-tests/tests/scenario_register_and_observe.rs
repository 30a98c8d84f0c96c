//! Scenario 1 (spec.md §8): a device registers with an observable resource,
//! auto-subscribe requests the backend subscription, and a later
//! notification for that resource is published on the device's topic.

mod support;

use std::sync::Arc;

use bridge_core::GenericMqttProcessor;
use bridge_peers::WatsonHooks;
use bridge_protocol::{BackendEvent, NotificationEntry, ObservationPayload, RegistrationEntry, ResourceDescriptor};
use bridge_transport::MockChannel;
use support::{b64, StubOrchestrator};

#[tokio::test]
async fn registration_auto_subscribes_and_notification_publishes_on_device_topic() {
    let orchestrator = Arc::new(StubOrchestrator::new(serde_json::Value::Null));
    let proc = GenericMqttProcessor::new(WatsonHooks::new(false), orchestrator, "acme", true, true);
    let channel = MockChannel::new();

    let register = BackendEvent {
        registrations: Some(vec![RegistrationEntry {
            ep: "d1".to_string(),
            ept: "light".to_string(),
            resources: vec![ResourceDescriptor { path: "/3303/0/5700".to_string(), obs: true }],
        }]),
        ..Default::default()
    };
    proc.handle_backend_event(&channel, &register).await;

    assert!(proc.registry.contains("d1").await);
    let key = bridge_protocol::SubscriptionKey::new("acme", "d1", "light", "/3303/0/5700");
    assert_eq!(proc.subscriptions.observable(&key).await, Some(true));

    let notify = BackendEvent {
        notifications: Some(vec![NotificationEntry {
            ep: "d1".to_string(),
            path: "/3303/0/5700".to_string(),
            payload: b64("21.5"),
            id: None,
        }]),
        ..Default::default()
    };
    proc.handle_backend_event(&channel, &notify).await;

    let published = channel
        .published_to("iot-2/type/light/id/d1/evt/notify/fmt/json")
        .into_iter()
        .next()
        .expect("notification published to device's notify topic");
    let observation: ObservationPayload = serde_json::from_slice(&published.payload).unwrap();
    assert_eq!(observation.value, serde_json::json!(21.5));
}

#[tokio::test]
async fn non_observable_resource_is_not_auto_subscribed() {
    let orchestrator = Arc::new(StubOrchestrator::new(serde_json::Value::Null));
    let proc = GenericMqttProcessor::new(WatsonHooks::new(false), orchestrator, "acme", true, true);
    let channel = MockChannel::new();

    let register = BackendEvent {
        registrations: Some(vec![RegistrationEntry {
            ep: "d2".to_string(),
            ept: "light".to_string(),
            resources: vec![ResourceDescriptor { path: "/3303/0/5750".to_string(), obs: false }],
        }]),
        ..Default::default()
    };
    proc.handle_backend_event(&channel, &register).await;

    let key = bridge_protocol::SubscriptionKey::new("acme", "d2", "light", "/3303/0/5750");
    assert_eq!(proc.subscriptions.observable(&key).await, Some(false));
}
