//! Shared test doubles for the end-to-end scenarios (spec.md §8).

use async_trait::async_trait;
use bridge_core::{Orchestrator, OrchestratorApiResult};
use bridge_protocol::{ApiRequest, CoapCommand, SubscriptionKey};
use serde_json::Value;
use tokio::sync::Mutex;

/// An orchestrator double whose endpoint-resource and API-request responses
/// are configured up front, mirroring a fixed backend reply rather than a
/// live one — every end-to-end scenario drives behavior purely through
/// `GenericMqttProcessor`/`PeerProcessor`, never through real HTTP.
pub struct StubOrchestrator {
    pub endpoint_response: Mutex<Value>,
    pub api_response: Mutex<OrchestratorApiResult>,
    pub subscribe_result: Mutex<bool>,
}

impl StubOrchestrator {
    pub fn new(endpoint_response: Value) -> Self {
        Self {
            endpoint_response: Mutex::new(endpoint_response),
            api_response: Mutex::new(OrchestratorApiResult { status: 200, body: Value::Null }),
            subscribe_result: Mutex::new(true),
        }
    }
}

#[async_trait]
impl Orchestrator for StubOrchestrator {
    async fn process_api_request_operation(&self, _request: &ApiRequest) -> OrchestratorApiResult {
        self.api_response.lock().await.clone()
    }

    async fn process_endpoint_resource_operation(&self, _command: &CoapCommand) -> Value {
        self.endpoint_response.lock().await.clone()
    }

    async fn subscribe_to_endpoint_resource(&self, _key: &SubscriptionKey) -> bool {
        *self.subscribe_result.lock().await
    }

    async fn pull_device_metadata(&self, _ep_name: &str) -> Option<Value> {
        None
    }
}

pub fn b64(s: &str) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(s)
}

/// A minimal one-request-per-connection HTTP server that replays a fixed
/// sequence of (status, body) responses, repeating the last one once the
/// sequence is exhausted. Used to drive `LongPollReader::run` against a
/// real socket without a broker or a mocking crate.
pub fn spawn_sequenced_http_server(
    responses: Vec<(u16, String)>,
) -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    let listener = TcpListener::from_std(listener).unwrap();

    let handle = tokio::spawn(async move {
        let mut step = 0usize;
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(pair) => pair,
                Err(_) => return,
            };
            let mut buf = [0u8; 4096];
            // Discard the request line/headers; these fixtures never branch on it.
            let _ = socket.read(&mut buf).await;

            let (status, body) = &responses[step.min(responses.len() - 1)];
            step += 1;

            let reason = reason_phrase(*status);
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (addr, handle)
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        410 => "Gone",
        _ => "Error",
    }
}
