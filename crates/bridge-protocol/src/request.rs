//! API request/response envelopes exchanged over the `.../api` topics
//! (spec.md §3, §6).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An API request as published by a peer cloud on an endpoint's `api` topic.
///
/// `api_request_data` carries verb-specific parameters as a JSON map; callers
/// that need a specific shape (e.g. a list of endpoint names for a bulk
/// lookup) deserialize it themselves rather than this type enumerating every
/// known `api_uri`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiRequest {
    pub api_uri: String,
    #[serde(default)]
    pub api_request_data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_options: Option<String>,
    pub api_verb: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_caller_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_content_type: Option<String>,
}

/// The envelope published back on the request-id-tagged reply topic.
///
/// `request_id` is assigned by the sequencer in `bridge-core` (wraps over
/// `1..32768`, spec.md §4.1); this type only carries the assigned value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub request_id: u16,
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(request_id: u16, status: u16, body: Value) -> Self {
        Self {
            request_id,
            status,
            body,
        }
    }
}
