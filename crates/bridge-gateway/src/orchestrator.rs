//! HTTP-backed `Orchestrator` (spec.md §2, §4.1, §4.2) — the bridge's only
//! calls into the LwM2M device-management backend's REST API, besides the
//! long-poll reader. Every method swallows its own errors: the orchestrator
//! trait returns bare values, not `Result`, so a backend failure here
//! degrades to a logged warning and a safe default rather than propagating.

use std::time::Duration;

use async_trait::async_trait;
use bridge_core::{Orchestrator, OrchestratorApiResult};
use bridge_protocol::{ApiRequest, CoapCommand, CoapVerb, SubscriptionKey};
use reqwest::{Client, Method};
use serde_json::Value;

use crate::config::BackendConfig;

pub struct HttpOrchestrator {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpOrchestrator {
    pub fn new(config: &BackendConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.backend_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.backend_base_url.trim_end_matches('/').to_string(),
            api_key: config.backend_api_key.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.request(method, format!("{}{}", self.base_url, path));
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

fn method_for_verb(verb: &str) -> Method {
    match verb.to_ascii_uppercase().as_str() {
        "GET" => Method::GET,
        "PUT" => Method::PUT,
        "POST" => Method::POST,
        "DELETE" => Method::DELETE,
        other => {
            tracing::warn!(verb = %other, "unrecognized api_verb, defaulting to GET");
            Method::GET
        }
    }
}

fn method_for_coap_verb(verb: CoapVerb) -> Method {
    match verb {
        CoapVerb::Get => Method::GET,
        CoapVerb::Put => Method::PUT,
        CoapVerb::Post => Method::POST,
        CoapVerb::Delete => Method::DELETE,
    }
}

#[async_trait]
impl Orchestrator for HttpOrchestrator {
    async fn process_api_request_operation(&self, request: &ApiRequest) -> OrchestratorApiResult {
        let mut builder = self
            .request(method_for_verb(&request.api_verb), &request.api_uri)
            .json(&request.api_request_data);
        if let Some(key) = &request.api_key {
            builder = builder.bearer_auth(key);
        }

        match builder.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.json::<Value>().await.unwrap_or(Value::Null);
                OrchestratorApiResult { status, body }
            }
            Err(e) => {
                tracing::warn!(uri = %request.api_uri, error = %e, "api request operation failed");
                OrchestratorApiResult {
                    status: 502,
                    body: serde_json::json!({"error": e.to_string()}),
                }
            }
        }
    }

    async fn process_endpoint_resource_operation(&self, command: &CoapCommand) -> Value {
        let ep = command.ep.as_deref().unwrap_or_default();
        let path = format!("/endpoints/{ep}{}", command.path);
        let mut builder = self.request(method_for_coap_verb(command.coap_verb), &path);
        if let Some(value) = &command.new_value {
            builder = builder.json(&serde_json::json!({"value": value}));
        }

        match builder.send().await {
            Ok(response) => response.json::<Value>().await.unwrap_or(Value::Null),
            Err(e) => {
                tracing::warn!(ep = %ep, path = %command.path, error = %e, "endpoint resource operation failed");
                Value::Null
            }
        }
    }

    async fn subscribe_to_endpoint_resource(&self, key: &SubscriptionKey) -> bool {
        let path = format!("/subscriptions/{}/{}{}", key.domain, key.ep_name, key.resource_path);
        match self.request(Method::PUT, &path).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!(ep = %key.ep_name, path = %key.resource_path, error = %e, "subscription request failed");
                false
            }
        }
    }

    async fn pull_device_metadata(&self, ep_name: &str) -> Option<Value> {
        let path = format!("/endpoints/{ep_name}");
        match self.request(Method::GET, &path).send().await {
            Ok(response) if response.status().is_success() => response.json::<Value>().await.ok(),
            Ok(response) => {
                tracing::warn!(ep = %ep_name, status = %response.status(), "device metadata pull rejected");
                None
            }
            Err(e) => {
                tracing::warn!(ep = %ep_name, error = %e, "device metadata pull failed");
                None
            }
        }
    }
}
