//! Async-response bookkeeping — correlates a CoAP command with its eventual
//! backend completion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coap::CoapVerb;

/// Recorded when the orchestrator returns a response matching the
/// "is-async-response" predicate (spec.md §3, §4.2). Destroyed when the
/// backend emits a completion carrying the same `async_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsyncRecord {
    pub async_id: String,
    pub verb: CoapVerb,
    /// Identifies the MQTT session this record's reply must publish on
    /// (per-device-session clouds have one session per `ep_name`; shared
    /// session clouds publish on the processor's default session).
    pub transport_handle: String,
    pub reply_topic: String,
    pub original_topic: String,
    pub original_message: String,
    pub ep_name: String,
    pub uri: String,
    pub creation_ts: DateTime<Utc>,
}

impl AsyncRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        async_id: impl Into<String>,
        verb: CoapVerb,
        transport_handle: impl Into<String>,
        reply_topic: impl Into<String>,
        original_topic: impl Into<String>,
        original_message: impl Into<String>,
        ep_name: impl Into<String>,
        uri: impl Into<String>,
    ) -> Self {
        Self {
            async_id: async_id.into(),
            verb,
            transport_handle: transport_handle.into(),
            reply_topic: reply_topic.into(),
            original_topic: original_topic.into(),
            original_message: original_message.into(),
            ep_name: ep_name.into(),
            uri: uri.into(),
            creation_ts: Utc::now(),
        }
    }

    /// Async-response handling (spec.md §4.2): only GET and PUT verbs are
    /// recorded — "we do not bridge HTTP status back" for other verbs.
    pub fn is_recordable_verb(verb: CoapVerb) -> bool {
        matches!(verb, CoapVerb::Get | CoapVerb::Put)
    }
}
