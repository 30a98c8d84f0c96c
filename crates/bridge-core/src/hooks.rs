//! Peer-specific hooks the generic processor calls into for topic
//! templating, envelope wrapping, and command decoding (spec.md §4.2).
//!
//! `bridge-peers` implements one of these per cloud (Google, Watson,
//! generic-broker); the generic processor in this crate is otherwise
//! ignorant of any cloud's topic layout.

use bridge_protocol::{CoapVerb, ObservationPayload, TopicSet};
use serde_json::Value;

/// Whether a cloud multiplexes every device over one shared MQTT session or
/// opens a dedicated session per device (spec.md §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTopology {
    PerDevice,
    Shared,
}

pub trait PeerHooks: Send + Sync {
    /// Build the full topic set for a newly registered endpoint, applying
    /// this cloud's `__EPNAME__`/`__DEVICE_TYPE__`/... template substitution.
    fn create_endpoint_topic_data(&self, ep_name: &str, ep_type: &str) -> TopicSet;

    /// Wrap the canonical payload per this cloud's envelope policy (spec.md
    /// §3; Google wraps nothing additional, Watson may wrap under a data
    /// key).
    fn create_observation(
        &self,
        verb: CoapVerb,
        ep_name: &str,
        uri: &str,
        value: Value,
    ) -> ObservationPayload;

    /// Extract the endpoint name from a positional topic. `None` when the
    /// topic is wildcarded and the caller should fall back to the message
    /// body's `ep` field.
    fn endpoint_name_from_topic(&self, topic: &str) -> Option<String>;

    fn coap_verb_from_topic(&self, topic: &str) -> Option<CoapVerb>;

    fn coap_uri_from_topic(&self, topic: &str) -> Option<String>;

    /// Where async and synchronous command replies publish — e.g. Watson's
    /// `evt/response` or Google's `/state` topic. Distinct from
    /// `observation_topic_for`: a reply answers a specific command, an
    /// observation is an unprompted notification from the device.
    fn reply_topic_for(&self, ep_name: &str, ep_type: &str, default_topic: &str) -> String;

    /// Where a backend notification (an observed resource's new value,
    /// unprompted by any command) publishes — e.g. Watson's `evt/notify` or
    /// Google's `/events` topic (spec.md §6, §8 scenario 1).
    fn observation_topic_for(&self, ep_name: &str, ep_type: &str) -> String;

    /// The wildcard topic the default session subscribes to for API
    /// requests (spec.md §4.1 `initListener`).
    fn request_topic_wildcard(&self) -> String;

    fn session_topology(&self) -> SessionTopology;
}
