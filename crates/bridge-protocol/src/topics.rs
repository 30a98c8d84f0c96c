//! Generic-broker topic builders and parser.
//!
//! Google and Watson have their own topic layouts (owned by `bridge-peers`,
//! since they're per-cloud policy); this module covers the generic-broker
//! shape spec.md §6 describes — IoT-Hub-style `<root>/<tag>/<domain>/...`
//! topics plus the draft MQTT format's `lwm2m/rd` and `lwm2m/ob` topics —
//! shared by every peer that doesn't need a bespoke layout.

/// A topic string decomposed into the segments the generic processor cares
/// about. `None` when a topic doesn't match the expected shape (e.g. a
/// retained broker topic unrelated to this bridge).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTopic {
    pub topic_root: String,
    pub request_tag: String,
    pub domain: String,
    pub suffix: Vec<String>,
}

/// Build `<topic_root>/<request_tag>/<domain>/<suffix...>`.
pub fn build_topic(topic_root: &str, request_tag: &str, domain: &str, suffix: &[&str]) -> String {
    let mut parts = vec![topic_root, request_tag, domain];
    parts.extend(suffix.iter().copied());
    parts.join("/")
}

/// Parse a topic of the shape `build_topic` produces. Requires at least the
/// three fixed segments; anything after them is the `suffix`.
pub fn parse_topic(topic: &str) -> Option<ParsedTopic> {
    let mut segments = topic.split('/');
    let topic_root = segments.next()?.to_string();
    let request_tag = segments.next()?.to_string();
    let domain = segments.next()?.to_string();
    if topic_root.is_empty() || request_tag.is_empty() || domain.is_empty() {
        return None;
    }
    let suffix = segments.map(str::to_string).collect();
    Some(ParsedTopic {
        topic_root,
        request_tag,
        domain,
        suffix,
    })
}

/// Draft-format registration topic a device publishes its LwM2M `rd` onto:
/// `<tenant>/lwm2m/rd/+/uplink` with the device slot filled in.
pub fn draft_registration_topic(tenant: &str, ep_name: &str) -> String {
    format!("{tenant}/lwm2m/rd/{ep_name}/uplink")
}

/// Draft-format observation-rewrite target the bridge publishes CBOR bodies
/// to (spec.md §4.1's `sendMessage` draft-format rewrite).
pub fn draft_observation_topic(tenant: &str, ep_name: &str) -> String {
    format!("{tenant}/lwm2m/ob/{ep_name}")
}

/// The subscription wildcard covering every endpoint's draft uplink topic.
pub fn draft_registration_wildcard(tenant: &str) -> String {
    format!("{tenant}/lwm2m/rd/+/uplink")
}
