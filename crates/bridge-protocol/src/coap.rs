//! CoAP command model — the LwM2M side of the bridge.

use serde::{Deserialize, Serialize};

/// A CoAP verb addressing a LwM2M resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CoapVerb {
    Get,
    Put,
    Post,
    Delete,
}

impl CoapVerb {
    /// Parse case-insensitively — Watson legacy bridges lower-case verbs in
    /// topic segments and message bodies (spec.md §9 open question).
    pub fn parse_loose(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "PUT" => Some(Self::Put),
            "POST" => Some(Self::Post),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// A CoAP command, either carried explicitly in a message body or derived
/// from positional topic segments (per-cloud policy — see `bridge-peers`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoapCommand {
    pub path: String,
    pub coap_verb: CoapVerb,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ep: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
}
