//! Endpoint (device) registry entry and topic-set model.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::credential::Credential;

/// Verbs a cloud's topic layout binds to a concrete topic string.
///
/// Some verbs are "subscribe" (inbound commands from the cloud), some are
/// "publish" (outbound observations, state, responses) — which is which is
/// per-cloud policy, decided by the peer processor, not by this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TopicVerb {
    Get,
    Put,
    Post,
    Delete,
    Api,
    Config,
    State,
    Event,
}

/// Per-endpoint mapping from verb to the concrete topic string a peer cloud
/// binds that verb to, plus the same set flattened to a string list for
/// subscribe/unsubscribe calls that don't care about verb identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicSet {
    pub topics: HashMap<TopicVerb, String>,
}

impl TopicSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, verb: TopicVerb, topic: impl Into<String>) {
        self.topics.insert(verb, topic.into());
    }

    pub fn get(&self, verb: TopicVerb) -> Option<&str> {
        self.topics.get(&verb).map(String::as_str)
    }

    /// Flatten to the topic-string list used by `subscribeToTopics` /
    /// `unsubscribe` (order is insertion order over a `HashMap`, so callers
    /// that need a stable order should sort).
    pub fn topic_string_list(&self) -> Vec<String> {
        self.topics.values().cloned().collect()
    }
}

/// A device known to the backend, mirrored on the cloud side.
///
/// Invariant: for any live endpoint exactly one entry exists in the endpoint
/// map keyed by `ep_name`, and — for per-device-session clouds — at most one
/// MQTT session keyed by `ep_name`. Enforcing that invariant is the job of
/// the registry that owns `Endpoint` values, not of this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    pub ep_name: String,
    pub ep_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credential>,
    pub topic_set: TopicSet,
    pub subscribed_paths: HashSet<String>,
}

impl Endpoint {
    pub fn new(ep_name: impl Into<String>, ep_type: impl Into<String>) -> Self {
        Self {
            ep_name: ep_name.into(),
            ep_type: ep_type.into(),
            credentials: None,
            topic_set: TopicSet::new(),
            subscribed_paths: HashSet::new(),
        }
    }
}

/// Uniquely identifies a subscription the backend is observing on behalf of
/// a peer cloud. The subscription manager enforces uniqueness over this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionKey {
    pub domain: String,
    pub ep_name: String,
    pub ep_type: String,
    pub resource_path: String,
}

impl SubscriptionKey {
    pub fn new(
        domain: impl Into<String>,
        ep_name: impl Into<String>,
        ep_type: impl Into<String>,
        resource_path: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            ep_name: ep_name.into(),
            ep_type: ep_type.into(),
            resource_path: resource_path.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_set_insert_and_get() {
        let mut set = TopicSet::new();
        set.insert(TopicVerb::Event, "iot-2/type/light/id/d1/evt/notify/fmt/json");
        assert_eq!(
            set.get(TopicVerb::Event),
            Some("iot-2/type/light/id/d1/evt/notify/fmt/json")
        );
        assert!(set.get(TopicVerb::Config).is_none());
    }

    #[test]
    fn topic_string_list_flattens_values() {
        let mut set = TopicSet::new();
        set.insert(TopicVerb::Get, "a/get");
        set.insert(TopicVerb::Put, "a/put");
        let mut list = set.topic_string_list();
        list.sort();
        assert_eq!(list, vec!["a/get".to_string(), "a/put".to_string()]);
    }

    #[test]
    fn endpoint_starts_with_no_subscriptions() {
        let ep = Endpoint::new("d1", "light");
        assert!(ep.subscribed_paths.is_empty());
        assert!(ep.credentials.is_none());
    }

    #[test]
    fn subscription_key_equality_is_structural() {
        let a = SubscriptionKey::new("dom", "d1", "light", "/3303/0/5700");
        let b = SubscriptionKey::new("dom", "d1", "light", "/3303/0/5700");
        assert_eq!(a, b);
    }
}
