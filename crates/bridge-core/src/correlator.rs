//! Async-response correlator (spec.md §4.5).
//!
//! Keyed by `async_id`. Every recorded `AsyncRecord` is resumed exactly
//! once: `take` removes it from the map as it returns it, so a retried or
//! duplicated backend completion can't double-publish.

use std::collections::HashMap;

use base64::Engine;
use bridge_protocol::{AsyncRecord, CoapVerb, ObservationPayload};
use serde_json::Value;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct AsyncResponseCorrelator {
    records: RwLock<HashMap<String, AsyncRecord>>,
}

impl AsyncResponseCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `record` if its verb is recordable (GET/PUT). Other verbs'
    /// asyncs are dropped by policy — "we do not bridge HTTP status back"
    /// (spec.md §4.2) — and this returns `false` without storing anything.
    pub async fn record(&self, record: AsyncRecord) -> bool {
        if !AsyncRecord::is_recordable_verb(record.verb) {
            return false;
        }
        self.records
            .write()
            .await
            .insert(record.async_id.clone(), record);
        true
    }

    pub async fn take(&self, async_id: &str) -> Option<AsyncRecord> {
        self.records.write().await.remove(async_id)
    }

    pub async fn contains(&self, async_id: &str) -> bool {
        self.records.read().await.contains_key(async_id)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

/// Format a backend completion as the observation to publish on the
/// record's `reply_topic` (spec.md §4.5, §8 boundary behavior).
///
/// `payload_b64` is the completion's base64-encoded payload, if any. For
/// `GET` and `PUT` the decoded string becomes the observation's `value`;
/// for `PUT` with no payload the `async_id` itself is published as a
/// placeholder value.
pub fn format_async_response_as_reply(
    record: &AsyncRecord,
    payload_b64: Option<&str>,
) -> ObservationPayload {
    let value = match payload_b64 {
        Some(encoded) => match base64::engine::general_purpose::STANDARD.decode(encoded) {
            Ok(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
            Err(_) => Value::String(record.async_id.clone()),
        },
        None => match record.verb {
            CoapVerb::Put => Value::String(record.async_id.clone()),
            _ => Value::Null,
        },
    };
    ObservationPayload::new(record.uri.clone(), record.ep_name.clone(), value, record.verb)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(verb: CoapVerb) -> AsyncRecord {
        AsyncRecord::new(
            "abc123",
            verb,
            "d1",
            "iot-2/type/light/id/d1/evt/notify/fmt/json",
            "iot-2/type/light/id/d1/cmd/get/fmt/json",
            "{}",
            "d1",
            "/3303/0/5700",
        )
    }

    #[tokio::test]
    async fn recordable_verbs_are_stored() {
        let correlator = AsyncResponseCorrelator::new();
        assert!(correlator.record(record(CoapVerb::Get)).await);
        assert!(correlator.contains("abc123").await);
    }

    #[tokio::test]
    async fn non_recordable_verbs_are_dropped() {
        let correlator = AsyncResponseCorrelator::new();
        assert!(!correlator.record(record(CoapVerb::Post)).await);
        assert_eq!(correlator.len().await, 0);
    }

    #[tokio::test]
    async fn take_removes_so_it_resumes_exactly_once() {
        let correlator = AsyncResponseCorrelator::new();
        correlator.record(record(CoapVerb::Get)).await;
        assert!(correlator.take("abc123").await.is_some());
        assert!(correlator.take("abc123").await.is_none());
    }

    #[test]
    fn get_with_payload_decodes_base64_into_value() {
        let rec = record(CoapVerb::Get);
        let obs = format_async_response_as_reply(&rec, Some("MjkuNzU="));
        assert_eq!(obs.value, Value::String("29.75".to_string()));
    }

    #[test]
    fn put_without_payload_publishes_async_id_placeholder() {
        let rec = record(CoapVerb::Put);
        let obs = format_async_response_as_reply(&rec, None);
        assert_eq!(obs.value, Value::String("abc123".to_string()));
    }

    #[test]
    fn get_without_payload_publishes_null() {
        let rec = record(CoapVerb::Get);
        let obs = format_async_response_as_reply(&rec, None);
        assert_eq!(obs.value, Value::Null);
    }
}
