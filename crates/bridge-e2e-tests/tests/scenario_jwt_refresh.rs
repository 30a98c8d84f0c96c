//! Scenario 3 (spec.md §8): a per-device credential nears expiry, the
//! refresh scheduler fires, the session reconnects on a new channel, and
//! every topic the device had subscribed to is resubscribed without losing
//! the registry's record of the device.

mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use bridge_core::GenericMqttProcessor;
use bridge_credentials::{CredentialResult, JwtRefreshScheduler, RefreshHandle};
use bridge_peers::GoogleHooks;
use bridge_protocol::{BackendEvent, RegistrationEntry, ResourceDescriptor};
use bridge_transport::{Channel, MockChannel};
use chrono::{Duration as ChronoDuration, Utc};
use support::StubOrchestrator;

/// Mirrors `GoogleProcessor::do_refresh`: mint a new token, dial a fresh
/// channel, resubscribe every topic the registry has on file, then swap
/// the session's channel for the new one.
struct FakeDeviceSession {
    proc: Arc<GenericMqttProcessor<GoogleHooks>>,
    ep_name: String,
    channel: tokio::sync::Mutex<Arc<MockChannel>>,
    refresh_calls: Arc<AtomicUsize>,
}

#[async_trait]
impl RefreshHandle for FakeDeviceSession {
    async fn refresh(&self) -> CredentialResult<chrono::DateTime<Utc>> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);

        let new_channel = Arc::new(MockChannel::new());
        if let Some(endpoint) = self.proc.registry.get(&self.ep_name).await {
            for topic in endpoint.topic_set.topic_string_list() {
                new_channel.subscribe(&topic, rumqttc::QoS::AtLeastOnce).await.unwrap();
            }
        }
        *self.channel.lock().await = new_channel;

        Ok(Utc::now() + ChronoDuration::milliseconds(30))
    }
}

#[tokio::test]
async fn refresh_reconnects_and_resubscribes_without_dropping_the_device() {
    let orchestrator = Arc::new(StubOrchestrator::new(serde_json::Value::Null));
    let proc = Arc::new(GenericMqttProcessor::new(
        GoogleHooks::new("proj", "us-central1", "registry"),
        orchestrator,
        "google",
        true,
        true,
    ));
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

    let refresh_calls = Arc::new(AtomicUsize::new(0));
    let session = Arc::new(FakeDeviceSession {
        proc: proc.clone(),
        ep_name: "d1".to_string(),
        channel: tokio::sync::Mutex::new(Arc::new(MockChannel::new())),
        refresh_calls: refresh_calls.clone(),
    });

    let scheduler = JwtRefreshScheduler::new();
    scheduler
        .spawn(
            "d1",
            session.clone() as Arc<dyn RefreshHandle>,
            Utc::now() + ChronoDuration::milliseconds(10),
            ChronoDuration::zero(),
            5,
            StdDuration::from_millis(5),
        )
        .await;

    tokio::time::sleep(StdDuration::from_millis(80)).await;
    scheduler.stop("d1").await;

    assert!(refresh_calls.load(Ordering::SeqCst) >= 2, "refresh must have fired at least once more than startup");
    assert!(proc.registry.contains("d1").await, "device stays registered across credential refresh");

    let new_channel = session.channel.lock().await.clone();
    assert!(new_channel.is_subscribed_to("/devices/d1/commands/get"));
    assert!(new_channel.is_subscribed_to("/devices/d1/events"));
}
