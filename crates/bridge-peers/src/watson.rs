//! IBM Watson IoT Platform processor (spec.md §4.2).
//!
//! Watson authenticates the whole org with one API key/token pair, so every
//! device shares a single MQTT session (`SessionTopology::Shared`) — unlike
//! Google there's no per-device credential refresh here, just one long-lived
//! `MqttChannel` every device's topics are registered against.

use std::sync::Arc;

use async_trait::async_trait;
use bridge_core::{GenericMqttProcessor, Orchestrator, PeerHooks, SessionTopology};
use bridge_protocol::{BackendEvent, CoapCommand, CoapVerb, ObservationPayload, TopicSet, TopicVerb};
use bridge_transport::{Channel, MqttChannel};
use rumqttc::QoS;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::WatsonConfig;
use crate::error::{PeerError, PeerResult};
use crate::processor::PeerProcessor;

pub struct WatsonHooks {
    legacy_lowercase: bool,
}

impl WatsonHooks {
    pub fn new(legacy_lowercase: bool) -> Self {
        Self { legacy_lowercase }
    }

    /// Watson's fixed `cmd`/`evt` command-id segment for a CoAP verb.
    /// Legacy tenants lower-case it; production tenants keep it upper-case —
    /// the two never collide for the same org since a tenant picks one mode.
    fn verb_segment(&self, verb: CoapVerb) -> String {
        let upper = format!("{verb:?}").to_uppercase();
        if self.legacy_lowercase {
            upper.to_lowercase()
        } else {
            upper
        }
    }
}

impl PeerHooks for WatsonHooks {
    fn create_endpoint_topic_data(&self, ep_name: &str, ep_type: &str) -> TopicSet {
        let mut set = TopicSet::new();
        for verb in [CoapVerb::Get, CoapVerb::Put, CoapVerb::Post, CoapVerb::Delete] {
            set.insert(
                match verb {
                    CoapVerb::Get => TopicVerb::Get,
                    CoapVerb::Put => TopicVerb::Put,
                    CoapVerb::Post => TopicVerb::Post,
                    CoapVerb::Delete => TopicVerb::Delete,
                },
                format!(
                    "iot-2/type/{ep_type}/id/{ep_name}/cmd/{}/fmt/json",
                    self.verb_segment(verb)
                ),
            );
        }
        set.insert(
            TopicVerb::Api,
            format!(
                "iot-2/type/{ep_type}/id/{ep_name}/cmd/{}/fmt/json",
                if self.legacy_lowercase { "api" } else { "API" }
            ),
        );
        set.insert(
            TopicVerb::Event,
            format!("iot-2/type/{ep_type}/id/{ep_name}/evt/notify/fmt/json"),
        );
        set.insert(
            TopicVerb::State,
            format!("iot-2/type/{ep_type}/id/{ep_name}/evt/response/fmt/json"),
        );
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
        let segs: Vec<&str> = topic.split('/').collect();
        if segs.len() >= 5 && segs[0] == "iot-2" && segs[1] == "type" && segs[3] == "id" {
            Some(segs[4].to_string())
        } else {
            None
        }
    }

    fn coap_verb_from_topic(&self, topic: &str) -> Option<CoapVerb> {
        let segs: Vec<&str> = topic.split('/').collect();
        if segs.len() >= 7 && segs[5] == "cmd" {
            CoapVerb::parse_loose(segs[6])
        } else {
            None
        }
    }

    fn coap_uri_from_topic(&self, _topic: &str) -> Option<String> {
        // Path travels in the JSON body, e.g. {"path": "/3303/0/5700", ...}.
        None
    }

    fn reply_topic_for(&self, ep_name: &str, ep_type: &str, _default_topic: &str) -> String {
        format!("iot-2/type/{ep_type}/id/{ep_name}/evt/response/fmt/json")
    }

    fn observation_topic_for(&self, ep_name: &str, ep_type: &str) -> String {
        format!("iot-2/type/{ep_type}/id/{ep_name}/evt/notify/fmt/json")
    }

    fn request_topic_wildcard(&self) -> String {
        "iot-2/type/+/id/+/cmd/+/fmt/json".to_string()
    }

    fn session_topology(&self) -> SessionTopology {
        SessionTopology::Shared
    }
}

struct Inner {
    generic: GenericMqttProcessor<WatsonHooks>,
    config: WatsonConfig,
    channel: RwLock<Option<Arc<dyn Channel>>>,
}

#[derive(Clone)]
pub struct WatsonProcessor(Arc<Inner>);

impl WatsonProcessor {
    pub fn new(config: WatsonConfig, orchestrator: Arc<dyn Orchestrator>, auto_subscribe: bool) -> Self {
        let hooks = WatsonHooks::new(config.iotf_legacy_lowercase);
        let generic = GenericMqttProcessor::new(hooks, orchestrator, "watson", auto_subscribe, true);
        Self(Arc::new(Inner {
            generic,
            config,
            channel: RwLock::new(None),
        }))
    }

    async fn channel(&self) -> PeerResult<Arc<dyn Channel>> {
        if let Some(channel) = self.0.channel.read().await.clone() {
            return Ok(channel);
        }

        let client_id = format!("g:{}:bridge:gateway", self.0.config.iotf_org_id);
        let (channel, mut eventloop) = MqttChannel::connect_with_password(
            &self.0.config.mqtt,
            &client_id,
            "watson-shared",
            &self.0.config.iotf_api_key,
            &self.0.config.iotf_auth_token,
        )?;
        tokio::spawn(async move {
            loop {
                if let Err(e) = eventloop.poll().await {
                    tracing::warn!(error = %e, "watson mqtt event loop error");
                    tokio::time::sleep(std::time::Duration::from_millis(5_000)).await;
                }
            }
        });

        let channel: Arc<dyn Channel> = Arc::new(channel);
        self.0.generic.init_listener(channel.as_ref(), &self.0.config.mqtt.mqtt_address).await?;
        *self.0.channel.write().await = Some(channel.clone());
        Ok(channel)
    }
}

#[async_trait]
impl PeerProcessor for WatsonProcessor {
    async fn connect(&self, _ep_name: &str, _ep_type: &str) -> PeerResult<()> {
        self.channel().await.map(|_| ())
    }

    async fn publish_observation(&self, ep_name: &str, observation: &ObservationPayload) -> PeerResult<()> {
        let channel = self.channel().await?;
        let endpoint = self
            .0
            .generic
            .registry
            .get(ep_name)
            .await
            .ok_or_else(|| PeerError::UnknownDevice(ep_name.to_string()))?;
        let topic = self.0.generic.hooks().observation_topic_for(ep_name, &endpoint.ep_type);

        let body = match &self.0.config.iotf_data_key {
            Some(key) => serde_json::to_vec(&serde_json::json!({ key: observation })),
            None => serde_json::to_vec(observation),
        }
        .unwrap_or_default();

        channel.publish(&topic, &body, QoS::AtLeastOnce).await?;
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
        let channel = self.channel().await?;
        let topic_data = self.0.generic.hooks().create_endpoint_topic_data(ep_name, ep_type);
        self.0
            .generic
            .subscribe(channel.as_ref(), ep_name, ep_type, topic_data)
            .await?;
        Ok(())
    }

    async fn delete_shadow(&self, ep_name: &str) -> PeerResult<()> {
        let channel = self.channel().await?;
        self.0.generic.unsubscribe(channel.as_ref(), ep_name).await?;
        Ok(())
    }

    async fn refresh_credentials(&self, ep_name: &str) -> PeerResult<()> {
        tracing::debug!(ep = %ep_name, "watson credentials are static, nothing to refresh");
        Ok(())
    }

    async fn handle_backend_event(&self, event: &BackendEvent) -> PeerResult<()> {
        let channel = self.channel().await?;
        self.0.generic.handle_backend_event(channel.as_ref(), event).await;
        Ok(())
    }
}
