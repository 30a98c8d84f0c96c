//! Orchestrator facade — the consumed interface the generic processor calls
//! into for backend operations (spec.md §2, §4.1, §4.2).
//!
//! `bridge-gateway` supplies the real HTTP-backed implementation along with
//! a test double; this crate only depends on the trait.

use async_trait::async_trait;
use bridge_protocol::{ApiRequest, CoapCommand, SubscriptionKey};
use serde_json::Value;

/// Result of `processApiRequestOperation` before the sequencer assigns a
/// `request_id` (spec.md §3 `ApiResponse`).
#[derive(Debug, Clone)]
pub struct OrchestratorApiResult {
    pub status: u16,
    pub body: Value,
}

#[async_trait]
pub trait Orchestrator: Send + Sync {
    async fn process_api_request_operation(&self, request: &ApiRequest) -> OrchestratorApiResult;

    /// Returns the raw orchestrator response. The generic processor applies
    /// `is_async_response` to decide whether to register an `AsyncRecord` or
    /// emit the result immediately (spec.md §4.2).
    async fn process_endpoint_resource_operation(&self, command: &CoapCommand) -> Value;

    async fn subscribe_to_endpoint_resource(&self, key: &SubscriptionKey) -> bool;

    async fn pull_device_metadata(&self, ep_name: &str) -> Option<Value>;
}

/// The "is-async-response" predicate (spec.md §4.2): the orchestrator
/// response carries an `async-response-id` key.
pub fn is_async_response(response: &Value) -> Option<String> {
    response
        .get("async-response-id")
        .and_then(Value::as_str)
        .map(str::to_string)
}
