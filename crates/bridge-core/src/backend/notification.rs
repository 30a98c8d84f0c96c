//! Notification handling — turns a backend notification into the
//! observation published to the peer cloud (spec.md §6, end-to-end
//! scenario 1).

use base64::Engine;
use bridge_protocol::{CoapVerb, NotificationEntry, ObservationPayload};
use serde_json::Value;

use crate::hooks::PeerHooks;

/// Decode a notification's base64 `payload` into the value an observation
/// carries. The decoded bytes are UTF-8 text; if that text itself parses as
/// JSON (a bare number, `true`/`false`, a quoted string) the parsed form is
/// used so a temperature reading round-trips as a number rather than the
/// string `"29.75"`. Anything that isn't valid UTF-8 or valid JSON falls
/// back to the raw decoded string.
pub fn decode_notification_value(payload_b64: &str) -> Value {
    let bytes = match base64::engine::general_purpose::STANDARD.decode(payload_b64) {
        Ok(bytes) => bytes,
        Err(_) => return Value::String(payload_b64.to_string()),
    };
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => return Value::String(String::from_utf8_lossy(e.as_bytes()).into_owned()),
    };
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

/// Build the observation to publish for one notification, per this cloud's
/// envelope policy.
pub fn build_observation<H: PeerHooks>(hooks: &H, entry: &NotificationEntry) -> ObservationPayload {
    let value = decode_notification_value(&entry.payload);
    hooks.create_observation(CoapVerb::Get, &entry.ep, &entry.path, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_numeric_payload_to_json_number() {
        let value = decode_notification_value("MjkuNzU=");
        assert_eq!(value, Value::from(29.75));
    }

    #[test]
    fn decodes_non_numeric_payload_to_string() {
        let encoded = base64::engine::general_purpose::STANDARD.encode("on");
        let value = decode_notification_value(&encoded);
        assert_eq!(value, Value::String("on".to_string()));
    }

    #[test]
    fn invalid_base64_falls_back_to_the_raw_string() {
        let value = decode_notification_value("not valid base64!!");
        assert_eq!(value, Value::String("not valid base64!!".to_string()));
    }
}
