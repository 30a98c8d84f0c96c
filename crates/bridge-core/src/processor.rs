//! Generic MQTT processor (spec.md §4.1) — the shared base every per-cloud
//! processor in `bridge-peers` composes rather than inherits from (spec.md
//! §9).

use std::sync::Arc;
use std::time::Duration;

use bridge_protocol::{
    ApiRequest, ApiResponse, BackendEvent, CoapCommand, CoapVerb, Endpoint, TopicSet, topics,
};
use bridge_transport::Channel;
use rumqttc::QoS;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::backend::{deregistration, device_deletion, notification, registration, reregistration};
use crate::correlator::{self, AsyncResponseCorrelator};
use crate::error::{BridgeError, BridgeResult};
use crate::hooks::PeerHooks;
use crate::ids::ApiRequestIdSequencer;
use crate::json_coerce;
use crate::orchestrator::{self, Orchestrator};
use crate::registry::EndpointRegistry;
use crate::subscriptions::SubscriptionManager;

/// Host value the generic processor refuses to connect to — mirrors the
/// "host is unconfigured or equals the sentinel default" failure in
/// `initListener` (spec.md §4.1).
pub const UNCONFIGURED_HOST_SENTINEL: &str = "0.0.0.0";

/// Parameters for the draft-format topic/body rewrite applied by
/// `send_message` when draft format is enabled (spec.md §4.1, GLOSSARY).
pub struct DraftRewrite<'a> {
    pub tenant: &'a str,
    pub ep_name: &'a str,
    pub token: &'a str,
    pub paths: Vec<String>,
}

#[derive(Serialize)]
struct DraftBody {
    operation: u8,
    token: String,
    paths: Vec<String>,
    payload: Vec<u8>,
}

pub struct GenericMqttProcessor<H: PeerHooks> {
    pub registry: EndpointRegistry,
    pub subscriptions: SubscriptionManager,
    pub correlator: AsyncResponseCorrelator,
    pub sequencer: ApiRequestIdSequencer,
    hooks: H,
    orchestrator: Arc<dyn Orchestrator>,
    domain: String,
    auto_subscribe: bool,
    delete_on_deregistration: bool,
    /// Bounds the command-dispatch critical section around
    /// `processEndpointResourceOperation` (spec.md §4.2 `lock_wait_ms`):
    /// one in-flight backend call at a time, a bounded wait for the permit,
    /// and an unbounded retry loop past that wait rather than a failure.
    command_lock: Semaphore,
    lock_wait_ms: u64,
}

impl<H: PeerHooks> GenericMqttProcessor<H> {
    pub fn new(
        hooks: H,
        orchestrator: Arc<dyn Orchestrator>,
        domain: impl Into<String>,
        auto_subscribe: bool,
        delete_on_deregistration: bool,
    ) -> Self {
        Self::with_lock_wait_ms(hooks, orchestrator, domain, auto_subscribe, delete_on_deregistration, 5_000)
    }

    pub fn with_lock_wait_ms(
        hooks: H,
        orchestrator: Arc<dyn Orchestrator>,
        domain: impl Into<String>,
        auto_subscribe: bool,
        delete_on_deregistration: bool,
        lock_wait_ms: u64,
    ) -> Self {
        Self {
            registry: EndpointRegistry::new(),
            subscriptions: SubscriptionManager::new(),
            correlator: AsyncResponseCorrelator::new(),
            sequencer: ApiRequestIdSequencer::new(),
            hooks,
            orchestrator,
            domain: domain.into(),
            auto_subscribe,
            delete_on_deregistration,
            command_lock: Semaphore::new(1),
            lock_wait_ms,
        }
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Establish the default session's request-topic subscription. Fails
    /// without retry if `mqtt_host` is empty or the sentinel default.
    pub async fn init_listener(&self, channel: &dyn Channel, mqtt_host: &str) -> BridgeResult<()> {
        if mqtt_host.is_empty() || mqtt_host == UNCONFIGURED_HOST_SENTINEL {
            return Err(BridgeError::Decode(format!(
                "mqtt host unconfigured (got '{mqtt_host}')"
            )));
        }
        channel
            .subscribe(&self.hooks.request_topic_wildcard(), QoS::AtLeastOnce)
            .await?;
        Ok(())
    }

    /// Idempotent: unsubscribing an already-unsubscribed wildcard is a
    /// harmless no-op from the broker's perspective.
    pub async fn stop_listener(&self, channel: &dyn Channel) -> BridgeResult<()> {
        channel
            .unsubscribe(&self.hooks.request_topic_wildcard())
            .await?;
        Ok(())
    }

    /// Dispatch an inbound MQTT message. Never lets a decode or orchestrator
    /// failure escape — every fallible step is logged and swallowed, per the
    /// "receive-loop callbacks never propagate" policy (spec.md §7).
    pub async fn on_message_receive(&self, channel: &dyn Channel, topic: &str, payload: &[u8]) {
        let body: Value = match serde_json::from_slice(payload) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(topic = %topic, error = %e, "malformed message body, dropping");
                return;
            }
        };

        if body.get("api_verb").is_some() {
            self.handle_api_request(channel, topic, body).await;
        } else {
            self.handle_peer_message(channel, topic, body).await;
        }
    }

    async fn handle_api_request(&self, channel: &dyn Channel, topic: &str, body: Value) {
        let request: ApiRequest = match serde_json::from_value(body) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(topic = %topic, error = %e, "malformed api request envelope");
                return;
            }
        };

        let result = self.orchestrator.process_api_request_operation(&request).await;
        let response = ApiResponse::new(self.sequencer.next(), result.status, result.body);

        let reply_topic = self.hooks.reply_topic_for("", "", topic);
        self.publish_json(channel, &reply_topic, &response).await;
    }

    /// Waits up to `lock_wait_ms` for the command-dispatch permit; on
    /// timeout, logs and retries indefinitely rather than failing the
    /// command (spec.md §4.2 "documented behavior").
    async fn acquire_command_lock(&self) -> tokio::sync::SemaphorePermit<'_> {
        loop {
            match tokio::time::timeout(Duration::from_millis(self.lock_wait_ms), self.command_lock.acquire()).await {
                Ok(Ok(permit)) => return permit,
                Ok(Err(_)) => unreachable!("command_lock semaphore is never closed"),
                Err(_) => tracing::warn!(
                    lock_wait_ms = self.lock_wait_ms,
                    "command-dispatch lock unavailable, retrying"
                ),
            }
        }
    }

    async fn handle_peer_message(&self, channel: &dyn Channel, topic: &str, body: Value) {
        let ep_name = self
            .hooks
            .endpoint_name_from_topic(topic)
            .or_else(|| body.get("ep").and_then(Value::as_str).map(str::to_string));
        let verb = self
            .hooks
            .coap_verb_from_topic(topic)
            .or_else(|| body.get("coap_verb").and_then(Value::as_str).and_then(CoapVerb::parse_loose));
        let uri = self
            .hooks
            .coap_uri_from_topic(topic)
            .or_else(|| body.get("path").and_then(Value::as_str).map(str::to_string));

        let (Some(ep_name), Some(verb), Some(uri)) = (ep_name, verb, uri) else {
            tracing::warn!(topic = %topic, "could not decode a CoAP command from message");
            return;
        };

        let new_value = body
            .get("new_value")
            .map(|v| json_coerce::coerce(v))
            .and_then(|v| v.as_str().map(str::to_string));

        let command = CoapCommand {
            path: uri.clone(),
            coap_verb: verb,
            new_value,
            ep: Some(ep_name.clone()),
            options: None,
        };

        let ept = self
            .registry
            .get(&ep_name)
            .await
            .map(|e| e.ep_type)
            .unwrap_or_default();
        let reply_topic = self.hooks.reply_topic_for(&ep_name, &ept, topic);

        let permit = self.acquire_command_lock().await;
        let response = self
            .orchestrator
            .process_endpoint_resource_operation(&command)
            .await;
        drop(permit);

        if let Some(async_id) = orchestrator::is_async_response(&response) {
            let record = bridge_protocol::AsyncRecord::new(
                async_id,
                verb,
                ep_name.clone(),
                reply_topic.clone(),
                topic.to_string(),
                String::new(),
                ep_name.clone(),
                uri.clone(),
            );
            self.correlator.record(record).await;
            return;
        }

        if verb == CoapVerb::Get {
            let observation = self
                .hooks
                .create_observation(verb, &ep_name, &uri, response);
            self.publish_json(channel, &reply_topic, &observation).await;
        }
    }

    /// Resume an async record on a matching backend completion, publishing
    /// exactly one observation on the stored reply topic (spec.md §4.5, §8).
    pub async fn resolve_async_response(
        &self,
        channel: &dyn Channel,
        async_id: &str,
        payload_b64: Option<&str>,
    ) {
        let Some(record) = self.correlator.take(async_id).await else {
            tracing::debug!(async_id = %async_id, "no outstanding async record for completion");
            return;
        };
        let observation = correlator::format_async_response_as_reply(&record, payload_b64);
        self.publish_json(channel, &record.reply_topic, &observation).await;
    }

    /// Publish on the default session. If `draft` is provided, the topic is
    /// rewritten to `<tenant>/lwm2m/ob/<ep>` and the body re-encoded as CBOR
    /// of `{operation: 19, token, paths, payload}` (spec.md §4.1).
    pub async fn send_message(
        &self,
        channel: &dyn Channel,
        topic: &str,
        bytes: &[u8],
        draft: Option<DraftRewrite<'_>>,
    ) -> BridgeResult<()> {
        match draft {
            Some(rewrite) => {
                let rewritten_topic =
                    topics::draft_observation_topic(rewrite.tenant, rewrite.ep_name);
                let body = DraftBody {
                    operation: 19,
                    token: rewrite.token.to_string(),
                    paths: rewrite.paths,
                    payload: bytes.to_vec(),
                };
                let mut cbor = Vec::new();
                ciborium::ser::into_writer(&body, &mut cbor)
                    .map_err(|e| BridgeError::Decode(format!("cbor encode failed: {e}")))?;
                channel
                    .publish(&rewritten_topic, &cbor, QoS::AtLeastOnce)
                    .await?;
            }
            None => {
                channel.publish(topic, bytes, QoS::AtLeastOnce).await?;
            }
        }
        Ok(())
    }

    async fn publish_json<T: Serialize>(&self, channel: &dyn Channel, topic: &str, value: &T) {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                if let Err(e) = channel.publish(topic, &bytes, QoS::AtLeastOnce).await {
                    tracing::warn!(topic = %topic, error = %e, "failed to publish");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize outbound message");
            }
        }
    }

    /// Validate/create the MQTT session for `ep_name`'s topic data and
    /// subscribe to it. The per-endpoint creation lock must be held by the
    /// caller across session creation — this method only performs the
    /// registry-side bookkeeping and topic subscription.
    pub async fn subscribe(
        &self,
        channel: &dyn Channel,
        ep_name: &str,
        ep_type: &str,
        topic_data: TopicSet,
    ) -> BridgeResult<()> {
        for topic in topic_data.topic_string_list() {
            channel.subscribe(&topic, QoS::AtLeastOnce).await?;
        }
        if !self.registry.contains(ep_name).await {
            let mut endpoint = Endpoint::new(ep_name, ep_type);
            endpoint.topic_set = topic_data;
            self.registry.insert(endpoint).await;
        } else {
            self.registry
                .mutate(ep_name, |ep| ep.topic_set = topic_data)
                .await;
        }
        Ok(())
    }

    /// Unsubscribe and remove `ep_name`'s registry entry. Idempotent: a
    /// second call with nothing left to remove returns `Ok(())`.
    pub async fn unsubscribe(&self, channel: &dyn Channel, ep_name: &str) -> BridgeResult<()> {
        if let Some(endpoint) = self.registry.get(ep_name).await {
            for topic in endpoint.topic_set.topic_string_list() {
                if let Err(e) = channel.unsubscribe(&topic).await {
                    tracing::warn!(ep = %ep_name, topic = %topic, error = %e, "unsubscribe failed");
                }
            }
        }
        self.subscriptions.remove_for_endpoint(ep_name).await;
        self.registry.remove(ep_name).await;
        self.registry.forget_creation_lock(ep_name).await;
        Ok(())
    }

    /// Route one backend event by top-level key (spec.md §2 control flow).
    pub async fn handle_backend_event(&self, channel: &dyn Channel, event: &BackendEvent) {
        if let Some(entries) = &event.registrations {
            registration::process_registration(
                &self.registry,
                &self.subscriptions,
                self.orchestrator.as_ref(),
                &self.hooks,
                &self.domain,
                entries,
                self.auto_subscribe,
            )
            .await;
        }

        if let Some(entries) = &event.reg_updates {
            let needing =
                reregistration::entries_needing_full_registration(&self.registry, entries).await;
            if !needing.is_empty() {
                registration::process_registration(
                    &self.registry,
                    &self.subscriptions,
                    self.orchestrator.as_ref(),
                    &self.hooks,
                    &self.domain,
                    &needing,
                    self.auto_subscribe,
                )
                .await;
            }
        }

        if let Some(ep_names) = &event.de_registrations {
            let to_delete = deregistration::process_deregistrations(
                &self.subscriptions,
                ep_names,
                self.delete_on_deregistration,
            )
            .await;
            for ep in ep_names {
                if let Err(e) = self.unsubscribe(channel, ep).await {
                    tracing::warn!(ep = %ep, error = %e, "unsubscribe during deregistration failed");
                }
            }
            if !to_delete.is_empty() {
                device_deletion::process_device_deletions(&self.registry, &self.subscriptions, &to_delete)
                    .await;
            }
        }

        // Expired registrations are treated the same as deregistrations:
        // the backend considers the device gone either way.
        if let Some(ep_names) = &event.registrations_expired {
            device_deletion::process_device_deletions(&self.registry, &self.subscriptions, ep_names)
                .await;
            for ep in ep_names {
                if let Err(e) = self.unsubscribe(channel, ep).await {
                    tracing::warn!(ep = %ep, error = %e, "unsubscribe on registration expiry failed");
                }
            }
        }

        if let Some(entries) = &event.notifications {
            for entry in entries {
                // A notification carrying an `id` that matches an outstanding
                // AsyncRecord is a backend completion for an earlier async
                // command, not a fresh observation (spec.md §4.5, §8 scenario 2).
                if let Some(async_id) = &entry.id {
                    if self.correlator.contains(async_id).await {
                        self.resolve_async_response(channel, async_id, Some(&entry.payload)).await;
                        continue;
                    }
                }

                let observation = notification::build_observation(&self.hooks, entry);
                let ept = self
                    .registry
                    .get(&entry.ep)
                    .await
                    .map(|e| e.ep_type)
                    .unwrap_or_default();
                let topic = self.hooks.observation_topic_for(&entry.ep, &ept);
                self.publish_json(channel, &topic, &observation).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_protocol::{ObservationPayload, RegistrationEntry, ResourceDescriptor, SubscriptionKey};
    use bridge_transport::MockChannel;
    use serde_json::json;

    use crate::hooks::SessionTopology;

    struct TestHooks;

    impl PeerHooks for TestHooks {
        fn create_endpoint_topic_data(&self, ep_name: &str, _ep_type: &str) -> TopicSet {
            let mut set = TopicSet::new();
            set.insert(bridge_protocol::TopicVerb::Event, format!("bridge/{ep_name}/evt"));
            set
        }
        fn create_observation(
            &self,
            verb: CoapVerb,
            ep_name: &str,
            uri: &str,
            value: Value,
        ) -> ObservationPayload {
            ObservationPayload::new(uri, ep_name, value, verb)
        }
        fn endpoint_name_from_topic(&self, topic: &str) -> Option<String> {
            topic.strip_prefix("bridge/").and_then(|rest| rest.split('/').next()).map(str::to_string)
        }
        fn coap_verb_from_topic(&self, _topic: &str) -> Option<CoapVerb> {
            Some(CoapVerb::Get)
        }
        fn coap_uri_from_topic(&self, _topic: &str) -> Option<String> {
            Some("/3303/0/5700".to_string())
        }
        fn reply_topic_for(&self, ep_name: &str, _ep_type: &str, _default_topic: &str) -> String {
            format!("bridge/{ep_name}/reply")
        }
        fn observation_topic_for(&self, ep_name: &str, _ep_type: &str) -> String {
            format!("bridge/{ep_name}/evt")
        }
        fn request_topic_wildcard(&self) -> String {
            "bridge/+/cmd".to_string()
        }
        fn session_topology(&self) -> SessionTopology {
            SessionTopology::Shared
        }
    }

    enum OrchestratorMode {
        Sync(Value),
        Async(String),
    }

    struct TestOrchestrator {
        mode: OrchestratorMode,
    }

    #[async_trait]
    impl Orchestrator for TestOrchestrator {
        async fn process_api_request_operation(
            &self,
            _request: &ApiRequest,
        ) -> OrchestratorApiResult {
            OrchestratorApiResult {
                status: 200,
                body: json!({"ok": true}),
            }
        }
        async fn process_endpoint_resource_operation(&self, _command: &CoapCommand) -> Value {
            match &self.mode {
                OrchestratorMode::Sync(v) => v.clone(),
                OrchestratorMode::Async(id) => json!({"async-response-id": id}),
            }
        }
        async fn subscribe_to_endpoint_resource(&self, _key: &SubscriptionKey) -> bool {
            true
        }
        async fn pull_device_metadata(&self, _ep_name: &str) -> Option<Value> {
            None
        }
    }

    fn processor(mode: OrchestratorMode) -> GenericMqttProcessor<TestHooks> {
        GenericMqttProcessor::new(TestHooks, Arc::new(TestOrchestrator { mode }), "domain", true, true)
    }

    #[tokio::test]
    async fn init_listener_rejects_unconfigured_host() {
        let proc = processor(OrchestratorMode::Sync(json!(29.75)));
        let channel = MockChannel::default();
        assert!(proc.init_listener(&channel, "").await.is_err());
        assert!(proc.init_listener(&channel, UNCONFIGURED_HOST_SENTINEL).await.is_err());
        assert!(proc.init_listener(&channel, "mqtt.example.com").await.is_ok());
        assert!(channel.is_subscribed_to("bridge/+/cmd"));
    }

    #[tokio::test]
    async fn synchronous_get_command_publishes_observation_on_reply_topic() {
        let proc = processor(OrchestratorMode::Sync(json!(29.75)));
        let channel = MockChannel::default();
        let body = json!({"path": "/3303/0/5700"});
        proc.on_message_receive(&channel, "bridge/d1/cmd", body.to_string().as_bytes())
            .await;

        let published = channel.last_published().expect("a reply was published");
        assert_eq!(published.topic, "bridge/d1/reply");
        let observation: ObservationPayload = serde_json::from_slice(&published.payload).unwrap();
        assert_eq!(observation.value, json!(29.75));
    }

    #[tokio::test]
    async fn async_response_is_recorded_and_resolved_exactly_once() {
        let proc = processor(OrchestratorMode::Async("async-1".to_string()));
        let channel = MockChannel::default();
        let body = json!({"path": "/3303/0/5700"});
        proc.on_message_receive(&channel, "bridge/d1/cmd", body.to_string().as_bytes())
            .await;
        assert!(proc.correlator.contains("async-1").await);
        assert!(channel.last_published().is_none());

        proc.resolve_async_response(&channel, "async-1", Some("MjkuNzU=")).await;
        let published = channel.last_published().expect("resumed reply published");
        assert_eq!(published.topic, "bridge/d1/reply");
        assert!(!proc.correlator.contains("async-1").await);

        // A duplicated completion finds nothing left to resume.
        channel.reset();
        proc.resolve_async_response(&channel, "async-1", Some("MjkuNzU=")).await;
        assert!(channel.last_published().is_none());
    }

    #[tokio::test]
    async fn api_request_is_dispatched_and_assigned_an_incrementing_id() {
        let proc = processor(OrchestratorMode::Sync(json!(null)));
        let channel = MockChannel::default();
        let body = json!({"api_uri": "/v2/endpoints", "api_verb": "get"});
        proc.on_message_receive(&channel, "bridge/api", body.to_string().as_bytes())
            .await;

        let published = channel.last_published().unwrap();
        let response: ApiResponse = serde_json::from_slice(&published.payload).unwrap();
        assert_eq!(response.request_id, 1);
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn malformed_message_is_dropped_without_publishing() {
        let proc = processor(OrchestratorMode::Sync(json!(1)));
        let channel = MockChannel::default();
        proc.on_message_receive(&channel, "bridge/d1/cmd", b"not json").await;
        assert!(channel.last_published().is_none());
    }

    #[tokio::test]
    async fn handle_backend_event_registers_then_notifies() {
        let proc = processor(OrchestratorMode::Sync(json!(null)));
        let channel = MockChannel::default();

        let event = BackendEvent {
            registrations: Some(vec![RegistrationEntry {
                ep: "d1".to_string(),
                ept: "light".to_string(),
                resources: vec![ResourceDescriptor {
                    path: "/3303/0/5700".to_string(),
                    obs: true,
                }],
            }]),
            notifications: Some(vec![bridge_protocol::NotificationEntry {
                ep: "d1".to_string(),
                path: "/3303/0/5700".to_string(),
                payload: base64::Engine::encode(
                    &base64::engine::general_purpose::STANDARD,
                    "29.75",
                ),
                id: None,
            }]),
            ..Default::default()
        };

        proc.handle_backend_event(&channel, &event).await;

        assert!(proc.registry.contains("d1").await);
        let published = channel.last_published().expect("notification published");
        assert_eq!(published.topic, "bridge/d1/evt");
        let observation: ObservationPayload = serde_json::from_slice(&published.payload).unwrap();
        assert_eq!(observation.value, json!(29.75));
    }

    #[tokio::test]
    async fn notification_carrying_a_matching_async_id_resumes_instead_of_publishing_fresh() {
        let proc = processor(OrchestratorMode::Async("abc123".to_string()));
        let channel = MockChannel::default();

        let body = json!({"path": "/3303/0/5700"});
        proc.on_message_receive(&channel, "bridge/d1/cmd", body.to_string().as_bytes())
            .await;
        assert!(proc.correlator.contains("abc123").await);

        let completion = BackendEvent {
            notifications: Some(vec![bridge_protocol::NotificationEntry {
                ep: "d1".to_string(),
                path: "/3303/0/5700".to_string(),
                payload: base64::Engine::encode(&base64::engine::general_purpose::STANDARD, "29.75"),
                id: Some("abc123".to_string()),
            }]),
            ..Default::default()
        };
        proc.handle_backend_event(&channel, &completion).await;

        assert!(!proc.correlator.contains("abc123").await);
        let published = channel.last_published().expect("resumed reply published");
        assert_eq!(published.topic, "bridge/d1/reply");
        let observation: ObservationPayload = serde_json::from_slice(&published.payload).unwrap();
        assert_eq!(observation.value, json!("29.75"));
    }

    #[tokio::test]
    async fn deregistration_tears_down_registry_and_subscriptions() {
        let proc = processor(OrchestratorMode::Sync(json!(null)));
        let channel = MockChannel::default();

        let register = BackendEvent {
            registrations: Some(vec![RegistrationEntry {
                ep: "d1".to_string(),
                ept: "light".to_string(),
                resources: vec![ResourceDescriptor {
                    path: "/3303/0/5700".to_string(),
                    obs: true,
                }],
            }]),
            ..Default::default()
        };
        proc.handle_backend_event(&channel, &register).await;
        assert!(proc.registry.contains("d1").await);

        let deregister = BackendEvent {
            de_registrations: Some(vec!["d1".to_string()]),
            ..Default::default()
        };
        proc.handle_backend_event(&channel, &deregister).await;
        assert!(!proc.registry.contains("d1").await);
        assert_eq!(proc.subscriptions.len().await, 0);
    }

    #[tokio::test]
    async fn send_message_draft_rewrites_topic_and_encodes_cbor() {
        let proc = processor(OrchestratorMode::Sync(json!(null)));
        let channel = MockChannel::default();
        proc.send_message(
            &channel,
            "ignored",
            b"payload",
            Some(DraftRewrite {
                tenant: "acme",
                ep_name: "d1",
                token: "tok",
                paths: vec!["/3303/0/5700".to_string()],
            }),
        )
        .await
        .unwrap();

        let published = channel.last_published().unwrap();
        assert_eq!(published.topic, "acme/lwm2m/ob/d1");
        assert_ne!(published.payload, b"payload".to_vec());
    }
}
