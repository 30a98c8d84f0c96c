//! Per-cloud capability surface (spec.md §9 redesign) — the async operations
//! a concrete peer processor (`GoogleProcessor`, `WatsonProcessor`,
//! `GenericBrokerProcessor`) exposes to `bridge-gateway`. Each implementer
//! owns, rather than inherits, a `bridge_core::GenericMqttProcessor`.

use async_trait::async_trait;
use bridge_protocol::{BackendEvent, CoapCommand, ObservationPayload};
use serde_json::Value;

use crate::error::PeerResult;

#[async_trait]
pub trait PeerProcessor: Send + Sync {
    /// Open (or reuse, for shared-session clouds) the MQTT session backing
    /// `ep_name` and subscribe to its command topics.
    async fn connect(&self, ep_name: &str, ep_type: &str) -> PeerResult<()>;

    /// Publish a canonical observation through this cloud's envelope policy.
    async fn publish_observation(
        &self,
        ep_name: &str,
        observation: &ObservationPayload,
    ) -> PeerResult<()>;

    /// Decode an inbound MQTT message into a CoAP command, trying the
    /// topic's positional segments first and falling back to the message
    /// body (spec.md §4.2).
    fn format_command(&self, topic: &str, body: &Value) -> Option<CoapCommand>;

    fn reply_topic_for(&self, ep_name: &str, ep_type: &str, default_topic: &str) -> String;

    /// Register a new device shadow and, for session-per-device clouds,
    /// open its dedicated MQTT session (spec.md §5 `createAndStartMQTTForEndpoint`).
    async fn create_shadow(&self, ep_name: &str, ep_type: &str) -> PeerResult<()>;

    /// Tear down a device's shadow and, if present, its dedicated session.
    async fn delete_shadow(&self, ep_name: &str) -> PeerResult<()>;

    /// Force an out-of-band credential refresh for one device (normally
    /// driven by `bridge-credentials`'s scheduler, not called directly).
    async fn refresh_credentials(&self, ep_name: &str) -> PeerResult<()>;

    /// Apply one backend long-poll batch: new/updated registrations,
    /// notifications, de-registrations and expiries. Shared-session clouds
    /// dispatch the whole batch over one channel; per-device clouds (Google)
    /// must split it per endpoint and open sessions for devices registering
    /// for the first time.
    async fn handle_backend_event(&self, event: &BackendEvent) -> PeerResult<()>;
}
