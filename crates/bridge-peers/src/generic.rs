//! Generic-broker processor for clouds with no bespoke topic layout — Azure
//! IoT Hub, AWS IoT, and plain test/dev brokers (spec.md §6
//! `mqtt_mds_topic_root`). Shares `bridge_protocol::topics`'s builder/parser
//! rather than hand-rolling a layout the way Google and Watson need to.

use std::sync::Arc;

use async_trait::async_trait;
use bridge_core::{GenericMqttProcessor, Orchestrator, PeerHooks, SessionTopology};
use bridge_protocol::topics::{build_topic, parse_topic};
use bridge_protocol::{BackendEvent, CoapCommand, CoapVerb, ObservationPayload, TopicSet, TopicVerb};
use bridge_transport::{Channel, MqttChannel};
use rumqttc::QoS;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::GenericConfig;
use crate::error::{PeerError, PeerResult};
use crate::processor::PeerProcessor;

pub struct GenericBrokerHooks {
    topic_root: String,
    request_tag: String,
    domain: String,
}

impl GenericBrokerHooks {
    pub fn new(topic_root: impl Into<String>, request_tag: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            topic_root: topic_root.into(),
            request_tag: request_tag.into(),
            domain: domain.into(),
        }
    }

    fn topic(&self, ep_name: &str, suffix: &str) -> String {
        build_topic(&self.topic_root, &self.request_tag, &self.domain, &[ep_name, suffix])
    }

    fn owns(&self, parsed: &bridge_protocol::topics::ParsedTopic) -> bool {
        parsed.topic_root == self.topic_root && parsed.request_tag == self.request_tag && parsed.domain == self.domain
    }
}

impl PeerHooks for GenericBrokerHooks {
    fn create_endpoint_topic_data(&self, ep_name: &str, _ep_type: &str) -> TopicSet {
        let mut set = TopicSet::new();
        set.insert(TopicVerb::Get, self.topic(ep_name, "get"));
        set.insert(TopicVerb::Put, self.topic(ep_name, "put"));
        set.insert(TopicVerb::Post, self.topic(ep_name, "post"));
        set.insert(TopicVerb::Delete, self.topic(ep_name, "delete"));
        set.insert(TopicVerb::Api, self.topic(ep_name, "api"));
        set.insert(TopicVerb::Event, self.topic(ep_name, "evt"));
        set.insert(TopicVerb::State, self.topic(ep_name, "state"));
        set.insert(TopicVerb::Config, self.topic(ep_name, "config"));
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
        let parsed = parse_topic(topic)?;
        if self.owns(&parsed) { parsed.suffix.first().cloned() } else { None }
    }

    fn coap_verb_from_topic(&self, topic: &str) -> Option<CoapVerb> {
        let parsed = parse_topic(topic)?;
        if !self.owns(&parsed) {
            return None;
        }
        parsed.suffix.get(1).and_then(|s| CoapVerb::parse_loose(s))
    }

    fn coap_uri_from_topic(&self, _topic: &str) -> Option<String> {
        None
    }

    fn reply_topic_for(&self, ep_name: &str, _ep_type: &str, _default_topic: &str) -> String {
        self.topic(ep_name, "state")
    }

    fn observation_topic_for(&self, ep_name: &str, _ep_type: &str) -> String {
        self.topic(ep_name, "evt")
    }

    fn request_topic_wildcard(&self) -> String {
        format!("{}/{}/{}/#", self.topic_root, self.request_tag, self.domain)
    }

    fn session_topology(&self) -> SessionTopology {
        SessionTopology::Shared
    }
}

struct Inner {
    generic: GenericMqttProcessor<GenericBrokerHooks>,
    config: GenericConfig,
    channel: RwLock<Option<Arc<dyn Channel>>>,
}

#[derive(Clone)]
pub struct GenericBrokerProcessor(Arc<Inner>);

impl GenericBrokerProcessor {
    pub fn new(config: GenericConfig, orchestrator: Arc<dyn Orchestrator>, auto_subscribe: bool) -> Self {
        let hooks = GenericBrokerHooks::new(
            config.mqtt_mds_topic_root.clone(),
            config.mqtt_request_tag.clone(),
            config.mqtt_device_domain.clone(),
        );
        let generic = GenericMqttProcessor::new(hooks, orchestrator, "generic", auto_subscribe, true);
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

        let client_id = format!("bridge-{}", self.0.config.mqtt_device_domain);
        let (channel, mut eventloop) = if self.0.config.mqtt.use_tls {
            MqttChannel::connect_mtls(&self.0.config.mqtt, &client_id, "generic-shared")?
        } else {
            MqttChannel::connect_with_password(&self.0.config.mqtt, &client_id, "generic-shared", "", "")?
        };
        tokio::spawn(async move {
            loop {
                if let Err(e) = eventloop.poll().await {
                    tracing::warn!(error = %e, "generic broker mqtt event loop error");
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
impl PeerProcessor for GenericBrokerProcessor {
    async fn connect(&self, _ep_name: &str, _ep_type: &str) -> PeerResult<()> {
        self.channel().await.map(|_| ())
    }

    async fn publish_observation(&self, ep_name: &str, observation: &ObservationPayload) -> PeerResult<()> {
        let channel = self.channel().await?;
        let topic = self.0.generic.hooks().observation_topic_for(ep_name, "");
        let body = match &self.0.config.mqtt_device_data_key {
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
        tracing::debug!(ep = %ep_name, "generic broker credentials are static, nothing to refresh");
        Ok(())
    }

    async fn handle_backend_event(&self, event: &BackendEvent) -> PeerResult<()> {
        let channel = self.channel().await?;
        self.0.generic.handle_backend_event(channel.as_ref(), event).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hooks() -> GenericBrokerHooks {
        GenericBrokerHooks::new("bridge", "req", "acme")
    }

    #[test]
    fn topic_shape_matches_builder() {
        let set = hooks().create_endpoint_topic_data("d1", "light");
        assert_eq!(set.get(TopicVerb::Get), Some("bridge/req/acme/d1/get"));
    }

    #[test]
    fn endpoint_name_from_topic_requires_matching_prefix() {
        let h = hooks();
        assert_eq!(
            h.endpoint_name_from_topic("bridge/req/acme/d1/get"),
            Some("d1".to_string())
        );
        assert_eq!(h.endpoint_name_from_topic("other/req/acme/d1/get"), None);
    }

    #[test]
    fn coap_verb_from_topic_reads_second_suffix_segment() {
        let h = hooks();
        assert_eq!(
            h.coap_verb_from_topic("bridge/req/acme/d1/put"),
            Some(CoapVerb::Put)
        );
    }

    #[test]
    fn session_topology_is_shared() {
        assert_eq!(hooks().session_topology(), SessionTopology::Shared);
    }
}
