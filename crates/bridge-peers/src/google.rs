//! Google Cloud IoT Core processor (spec.md §4.2).
//!
//! Google scopes JWT auth to one device per connection, so this is the one
//! cloud with `SessionTopology::PerDevice`: every device gets its own
//! `MqttChannel` and its own entry in the JWT-refresh scheduler, but they
//! all share a single `GenericMqttProcessor<GoogleHooks>` — the hooks never
//! carry per-device state, only the static project/region/registry triple.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use bridge_core::{GenericMqttProcessor, Orchestrator, PeerHooks, SessionTopology};
use bridge_credentials::{ConnectionState, ConnectionStateTracker, JwtRefreshScheduler, RefreshHandle};
use bridge_protocol::{BackendEvent, CoapCommand, CoapVerb, ObservationPayload, TopicSet, TopicVerb};
use bridge_transport::{Channel, MockChannel, MqttChannel, jwt};
use chrono::{DateTime, Duration, Utc};
use rumqttc::QoS;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::GoogleConfig;
use crate::error::{PeerError, PeerResult};
use crate::processor::PeerProcessor;

pub struct GoogleHooks {
    project_id: String,
    region: String,
    registry_name: String,
}

impl GoogleHooks {
    pub fn new(
        project_id: impl Into<String>,
        region: impl Into<String>,
        registry_name: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            region: region.into(),
            registry_name: registry_name.into(),
        }
    }

    fn client_id(&self, ep_name: &str) -> String {
        format!(
            "projects/{}/locations/{}/registries/{}/devices/{}",
            self.project_id, self.region, self.registry_name, ep_name
        )
    }
}

impl PeerHooks for GoogleHooks {
    fn create_endpoint_topic_data(&self, ep_name: &str, _ep_type: &str) -> TopicSet {
        let mut set = TopicSet::new();
        set.insert(TopicVerb::Get, format!("/devices/{ep_name}/commands/get"));
        set.insert(TopicVerb::Put, format!("/devices/{ep_name}/commands/put"));
        set.insert(TopicVerb::Post, format!("/devices/{ep_name}/commands/post"));
        set.insert(TopicVerb::Delete, format!("/devices/{ep_name}/commands/delete"));
        set.insert(TopicVerb::Api, format!("/devices/{ep_name}/commands/api"));
        set.insert(TopicVerb::Config, format!("/devices/{ep_name}/config"));
        set.insert(TopicVerb::Event, format!("/devices/{ep_name}/events"));
        set.insert(TopicVerb::State, format!("/devices/{ep_name}/state"));
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
        let segs: Vec<&str> = topic.split('/').filter(|s| !s.is_empty()).collect();
        if segs.len() >= 2 && segs[0] == "devices" {
            Some(segs[1].to_string())
        } else {
            None
        }
    }

    fn coap_verb_from_topic(&self, topic: &str) -> Option<CoapVerb> {
        let segs: Vec<&str> = topic.split('/').filter(|s| !s.is_empty()).collect();
        if segs.len() >= 4 && segs[0] == "devices" && segs[2] == "commands" {
            CoapVerb::parse_loose(segs[3])
        } else {
            None
        }
    }

    fn coap_uri_from_topic(&self, _topic: &str) -> Option<String> {
        // Google carries the LwM2M path in the message body, never the topic.
        None
    }

    fn reply_topic_for(&self, ep_name: &str, _ep_type: &str, _default_topic: &str) -> String {
        format!("/devices/{ep_name}/state")
    }

    fn observation_topic_for(&self, ep_name: &str, _ep_type: &str) -> String {
        format!("/devices/{ep_name}/events")
    }

    fn request_topic_wildcard(&self) -> String {
        "/devices/+/commands/#".to_string()
    }

    fn session_topology(&self) -> SessionTopology {
        SessionTopology::PerDevice
    }
}

/// Every endpoint name a batch touches, across all five event categories.
fn touched_eps(event: &BackendEvent) -> HashSet<String> {
    let mut eps = HashSet::new();
    if let Some(v) = &event.registrations {
        eps.extend(v.iter().map(|r| r.ep.clone()));
    }
    if let Some(v) = &event.reg_updates {
        eps.extend(v.iter().map(|r| r.ep.clone()));
    }
    if let Some(v) = &event.notifications {
        eps.extend(v.iter().map(|n| n.ep.clone()));
    }
    if let Some(v) = &event.de_registrations {
        eps.extend(v.iter().cloned());
    }
    if let Some(v) = &event.registrations_expired {
        eps.extend(v.iter().cloned());
    }
    eps
}

/// Splits a batch down to the slice relevant to one device, so each gets
/// dispatched over its own per-device channel.
fn filter_for_ep(event: &BackendEvent, ep_name: &str) -> BackendEvent {
    BackendEvent {
        notifications: event
            .notifications
            .as_ref()
            .map(|v| v.iter().filter(|n| n.ep == ep_name).cloned().collect())
            .filter(|v: &Vec<_>| !v.is_empty()),
        reg_updates: event
            .reg_updates
            .as_ref()
            .map(|v| v.iter().filter(|r| r.ep == ep_name).cloned().collect())
            .filter(|v: &Vec<_>| !v.is_empty()),
        de_registrations: event
            .de_registrations
            .as_ref()
            .map(|v| v.iter().filter(|ep| ep.as_str() == ep_name).cloned().collect())
            .filter(|v: &Vec<_>| !v.is_empty()),
        registrations: event
            .registrations
            .as_ref()
            .map(|v| v.iter().filter(|r| r.ep == ep_name).cloned().collect())
            .filter(|v: &Vec<_>| !v.is_empty()),
        registrations_expired: event
            .registrations_expired
            .as_ref()
            .map(|v| v.iter().filter(|ep| ep.as_str() == ep_name).cloned().collect())
            .filter(|v: &Vec<_>| !v.is_empty()),
    }
}

struct DeviceSession {
    channel: Arc<dyn Channel>,
    state: ConnectionStateTracker,
}

struct Inner {
    generic: GenericMqttProcessor<GoogleHooks>,
    config: GoogleConfig,
    private_key_pem: Vec<u8>,
    sessions: RwLock<HashMap<String, DeviceSession>>,
    scheduler: JwtRefreshScheduler,
}

/// Cheap to clone — every clone shares the same sessions map, registry, and
/// refresh scheduler through the inner `Arc`.
#[derive(Clone)]
pub struct GoogleProcessor(Arc<Inner>);

impl GoogleProcessor {
    pub fn new(config: GoogleConfig, orchestrator: Arc<dyn Orchestrator>, auto_subscribe: bool) -> PeerResult<Self> {
        let private_key_pem = std::fs::read(&config.google_cloud_jwt_private_key_path).map_err(|e| {
            PeerError::Transport(bridge_transport::TransportError::Credential(format!(
                "failed to read Google JWT private key '{}': {e}",
                config.google_cloud_jwt_private_key_path
            )))
        })?;

        let hooks = GoogleHooks::new(
            config.google_cloud_project_id.clone(),
            config.google_cloud_region.clone(),
            config.google_cloud_registry_name.clone(),
        );
        let generic = GenericMqttProcessor::with_lock_wait_ms(
            hooks,
            orchestrator,
            "google",
            auto_subscribe,
            true,
            config.google_wait_for_lock_ms,
        );

        Ok(Self(Arc::new(Inner {
            generic,
            config,
            private_key_pem,
            sessions: RwLock::new(HashMap::new()),
            scheduler: JwtRefreshScheduler::new(),
        })))
    }

    async fn mint_and_dial(&self, ep_name: &str) -> PeerResult<(Arc<dyn Channel>, DateTime<Utc>)> {
        let (token, expiry) = jwt::mint(
            &self.0.private_key_pem,
            &self.0.config.google_cloud_project_id,
            Duration::seconds(self.0.config.google_cloud_jwt_ttl_secs),
            Utc::now(),
        )?;

        let client_id = self.0.generic.hooks().client_id(ep_name);
        let (channel, mut eventloop) = MqttChannel::connect_with_password(
            &self.0.config.mqtt,
            &client_id,
            ep_name.to_string(),
            "unused",
            &token,
        )?;

        tokio::spawn(async move {
            loop {
                if let Err(e) = eventloop.poll().await {
                    tracing::warn!(error = %e, "google mqtt event loop error");
                    tokio::time::sleep(std::time::Duration::from_millis(5_000)).await;
                }
            }
        });

        Ok((Arc::new(channel), expiry))
    }

    async fn resubscribe_all(&self, ep_name: &str, channel: &dyn Channel) {
        let Some(endpoint) = self.0.generic.registry.get(ep_name).await else {
            return;
        };
        for topic in endpoint.topic_set.topic_string_list() {
            if let Err(e) = channel.subscribe(&topic, QoS::AtLeastOnce).await {
                tracing::warn!(ep = %ep_name, topic = %topic, error = %e, "resubscribe failed after credential refresh");
            }
        }
    }

    async fn do_refresh(&self, ep_name: &str) -> PeerResult<DateTime<Utc>> {
        let old_channel = {
            let mut sessions = self.0.sessions.write().await;
            let session = sessions
                .get_mut(ep_name)
                .ok_or_else(|| PeerError::UnknownDevice(ep_name.to_string()))?;
            session.state.transition(ConnectionState::Refreshing);
            session.channel.clone()
        };
        old_channel.disconnect().await?;

        let (new_channel, expiry) = self.mint_and_dial(ep_name).await?;
        self.0
            .generic
            .init_listener(new_channel.as_ref(), &self.0.config.mqtt.mqtt_address)
            .await?;
        self.resubscribe_all(ep_name, new_channel.as_ref()).await;

        let mut sessions = self.0.sessions.write().await;
        if let Some(session) = sessions.get_mut(ep_name) {
            session.channel = new_channel;
            session.state.transition(ConnectionState::Connected);
        }

        Ok(expiry)
    }
}

#[async_trait]
impl PeerProcessor for GoogleProcessor {
    async fn connect(&self, ep_name: &str, _ep_type: &str) -> PeerResult<()> {
        if self.0.sessions.read().await.contains_key(ep_name) {
            return Err(PeerError::AlreadyConnected(ep_name.to_string()));
        }

        let (channel, expiry) = self.mint_and_dial(ep_name).await?;
        self.0
            .generic
            .init_listener(channel.as_ref(), &self.0.config.mqtt.mqtt_address)
            .await?;

        let mut state = ConnectionStateTracker::new();
        state.transition(ConnectionState::Connecting);
        state.transition(ConnectionState::Connected);
        self.0
            .sessions
            .write()
            .await
            .insert(ep_name.to_string(), DeviceSession { channel, state });

        let handle: Arc<dyn RefreshHandle> = Arc::new(GoogleRefreshHandle {
            ep_name: ep_name.to_string(),
            processor: self.clone(),
        });
        self.0
            .scheduler
            .spawn(
                ep_name.to_string(),
                handle,
                expiry,
                Duration::seconds(self.0.config.google_cloud_jwt_refresh_slack_secs),
                self.0.config.google_cloud_jwt_max_retries,
                std::time::Duration::from_millis(self.0.config.google_cloud_jwt_retry_wait_ms),
            )
            .await;

        Ok(())
    }

    async fn publish_observation(&self, ep_name: &str, observation: &ObservationPayload) -> PeerResult<()> {
        let sessions = self.0.sessions.read().await;
        let session = sessions
            .get(ep_name)
            .ok_or_else(|| PeerError::UnknownDevice(ep_name.to_string()))?;
        let topic = self.0.generic.hooks().observation_topic_for(ep_name, "");
        let body = serde_json::to_vec(observation).unwrap_or_default();
        session.channel.publish(&topic, &body, QoS::AtLeastOnce).await?;
        Ok(())
    }

    fn format_command(&self, topic: &str, body: &Value) -> Option<CoapCommand> {
        let hooks = self.0.generic.hooks();
        let ep = hooks
            .endpoint_name_from_topic(topic)
            .or_else(|| body.get("ep").and_then(Value::as_str).map(str::to_string))?;
        let verb = hooks.coap_verb_from_topic(topic).or_else(|| {
            body.get("coap_verb")
                .and_then(Value::as_str)
                .and_then(CoapVerb::parse_loose)
        })?;
        let path = body.get("path").and_then(Value::as_str)?.to_string();
        Some(CoapCommand {
            path,
            coap_verb: verb,
            new_value: body.get("new_value").and_then(Value::as_str).map(str::to_string),
            ep: Some(ep),
            options: None,
        })
    }

    fn reply_topic_for(&self, ep_name: &str, ep_type: &str, default_topic: &str) -> String {
        self.0.generic.hooks().reply_topic_for(ep_name, ep_type, default_topic)
    }

    async fn create_shadow(&self, ep_name: &str, ep_type: &str) -> PeerResult<()> {
        if !self.0.sessions.read().await.contains_key(ep_name) {
            self.connect(ep_name, ep_type).await?;
        }

        let sessions = self.0.sessions.read().await;
        let session = sessions
            .get(ep_name)
            .ok_or_else(|| PeerError::UnknownDevice(ep_name.to_string()))?;
        let topic_data = self.0.generic.hooks().create_endpoint_topic_data(ep_name, ep_type);
        self.0
            .generic
            .subscribe(session.channel.as_ref(), ep_name, ep_type, topic_data)
            .await?;
        Ok(())
    }

    async fn delete_shadow(&self, ep_name: &str) -> PeerResult<()> {
        self.0.scheduler.stop(ep_name).await;
        let session = self.0.sessions.write().await.remove(ep_name);
        if let Some(session) = session {
            self.0.generic.unsubscribe(session.channel.as_ref(), ep_name).await?;
            session.channel.disconnect().await?;
        }
        Ok(())
    }

    async fn refresh_credentials(&self, ep_name: &str) -> PeerResult<()> {
        self.do_refresh(ep_name).await.map(|_| ())
    }

    /// Google has no shared channel to dispatch a batch over, so the batch
    /// is split per device and each slice is replayed through the generic
    /// processor on that device's own session. A device registering for the
    /// first time is connected before its slice is dispatched; a batch entry
    /// for a device that never connects (e.g. a stale deregistration) still
    /// gets its backend-side bookkeeping applied, just against a throwaway
    /// channel that nothing is actually subscribed on.
    async fn handle_backend_event(&self, event: &BackendEvent) -> PeerResult<()> {
        let ept_by_ep: HashMap<String, String> = event
            .registrations
            .iter()
            .flatten()
            .chain(event.reg_updates.iter().flatten())
            .map(|r| (r.ep.clone(), r.ept.clone()))
            .collect();

        for ep_name in touched_eps(event) {
            let sub_event = filter_for_ep(event, &ep_name);
            if sub_event.is_empty() {
                continue;
            }

            let existing = self.0.sessions.read().await.get(&ep_name).map(|s| s.channel.clone());
            let channel: Arc<dyn Channel> = match existing {
                Some(channel) => channel,
                None if ept_by_ep.contains_key(&ep_name) => {
                    let ep_type = &ept_by_ep[&ep_name];
                    if let Err(e) = self.connect(&ep_name, ep_type).await {
                        tracing::warn!(ep = %ep_name, error = %e, "failed to open session for newly registered device");
                        continue;
                    }
                    self.0
                        .sessions
                        .read()
                        .await
                        .get(&ep_name)
                        .map(|s| s.channel.clone())
                        .unwrap_or_else(|| Arc::new(MockChannel::new()))
                }
                None => Arc::new(MockChannel::new()),
            };

            self.0.generic.handle_backend_event(channel.as_ref(), &sub_event).await;
        }
        Ok(())
    }
}

struct GoogleRefreshHandle {
    ep_name: String,
    processor: GoogleProcessor,
}

#[async_trait]
impl RefreshHandle for GoogleRefreshHandle {
    async fn refresh(&self) -> bridge_credentials::CredentialResult<DateTime<Utc>> {
        self.processor
            .do_refresh(&self.ep_name)
            .await
            .map_err(|e| bridge_credentials::CredentialError::Unauthorized(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hooks() -> GoogleHooks {
        GoogleHooks::new("proj-1", "us-central1", "reg-1")
    }

    #[test]
    fn endpoint_name_from_topic_extracts_device_segment() {
        assert_eq!(
            hooks().endpoint_name_from_topic("/devices/d1/commands/get"),
            Some("d1".to_string())
        );
        assert_eq!(hooks().endpoint_name_from_topic("/devices"), None);
    }

    #[test]
    fn coap_verb_from_topic_parses_command_verb() {
        assert_eq!(
            hooks().coap_verb_from_topic("/devices/d1/commands/put"),
            Some(CoapVerb::Put)
        );
        assert_eq!(hooks().coap_verb_from_topic("/devices/d1/state"), None);
    }

    #[test]
    fn coap_uri_from_topic_always_falls_back_to_body() {
        assert_eq!(hooks().coap_uri_from_topic("/devices/d1/commands/get"), None);
    }

    #[test]
    fn reply_topic_targets_state() {
        assert_eq!(hooks().reply_topic_for("d1", "light", ""), "/devices/d1/state");
    }

    #[test]
    fn observation_topic_targets_events() {
        assert_eq!(hooks().observation_topic_for("d1", "light"), "/devices/d1/events");
    }

    #[test]
    fn session_topology_is_per_device() {
        assert_eq!(hooks().session_topology(), SessionTopology::PerDevice);
    }

    #[test]
    fn topic_data_covers_every_verb() {
        let set = hooks().create_endpoint_topic_data("d1", "light");
        assert_eq!(set.get(TopicVerb::Get), Some("/devices/d1/commands/get"));
        assert_eq!(set.get(TopicVerb::State), Some("/devices/d1/state"));
    }

    fn sample_event() -> BackendEvent {
        BackendEvent {
            notifications: Some(vec![bridge_protocol::NotificationEntry {
                ep: "d1".into(),
                path: "/3303/0/5700".into(),
                payload: "MjA=".into(),
                id: None,
            }]),
            registrations: Some(vec![bridge_protocol::RegistrationEntry {
                ep: "d2".into(),
                ept: "light".into(),
                resources: vec![],
            }]),
            de_registrations: Some(vec!["d3".into()]),
            reg_updates: None,
            registrations_expired: None,
        }
    }

    #[test]
    fn touched_eps_covers_every_category() {
        let eps = touched_eps(&sample_event());
        assert_eq!(eps.len(), 3);
        assert!(eps.contains("d1"));
        assert!(eps.contains("d2"));
        assert!(eps.contains("d3"));
    }

    #[test]
    fn filter_for_ep_isolates_a_single_device() {
        let event = sample_event();

        let d1 = filter_for_ep(&event, "d1");
        assert!(d1.notifications.is_some());
        assert!(d1.registrations.is_none());
        assert!(d1.de_registrations.is_none());

        let d2 = filter_for_ep(&event, "d2");
        assert!(d2.notifications.is_none());
        assert!(d2.registrations.is_some());

        let unknown = filter_for_ep(&event, "nobody");
        assert!(unknown.is_empty());
    }
}
