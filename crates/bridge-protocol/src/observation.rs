//! Canonical observation payload emitted to peer clouds.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coap::CoapVerb;

/// The canonical shape emitted to clouds (spec.md §3).
///
/// The unified-format fields (`resource_id`, `device_id`, `payload`,
/// `method`) are only serialized when `with_unified_format` is set — they
/// duplicate `path`/`ep`/`value`/`coap_verb` in a shape some cloud
/// dashboards expect, base64-encoding the string form of `value` into
/// `payload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationPayload {
    pub path: String,
    pub ep: String,
    pub value: Value,
    pub coap_verb: CoapVerb,
    #[serde(skip_serializing_if = "Option::is_none", rename = "resourceId")]
    pub resource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "deviceId")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl ObservationPayload {
    /// Build the canonical payload, optionally populating the unified-format
    /// fields (spec.md §3, §9 glossary).
    pub fn new(path: impl Into<String>, ep: impl Into<String>, value: Value, verb: CoapVerb) -> Self {
        Self {
            path: path.into(),
            ep: ep.into(),
            value,
            coap_verb: verb,
            resource_id: None,
            device_id: None,
            payload: None,
            method: None,
        }
    }

    /// Populate the unified-format fields from the canonical ones. `path` is
    /// expected in `/obj/inst/res` form; the leading slash is stripped for
    /// `resourceId`.
    pub fn with_unified_format(mut self) -> Self {
        self.resource_id = Some(self.path.trim_start_matches('/').to_string());
        self.device_id = Some(self.ep.clone());
        let value_str = match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        self.payload = Some(base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            value_str.as_bytes(),
        ));
        self.method = Some(format!("{:?}", self.coap_verb).to_uppercase());
        self
    }
}
