//! Bridges the backend long-poll reader to the active `PeerProcessor`
//! (spec.md §2 control flow): establishes/tears down device shadows for
//! registrations and de-registrations, then replays the whole batch through
//! the processor's backend-event handling for subscription bookkeeping,
//! metadata pulls, and notification publishing.

use std::sync::Arc;

use async_trait::async_trait;
use bridge_longpoll::BackendEventHandler;
use bridge_peers::PeerProcessor;
use bridge_protocol::BackendEvent;

pub struct GatewayEventHandler {
    processor: Arc<dyn PeerProcessor>,
}

impl GatewayEventHandler {
    pub fn new(processor: Arc<dyn PeerProcessor>) -> Self {
        Self { processor }
    }
}

#[async_trait]
impl BackendEventHandler for GatewayEventHandler {
    async fn handle(&self, event: BackendEvent) {
        if let Some(entries) = &event.registrations {
            for entry in entries {
                if let Err(e) = self.processor.create_shadow(&entry.ep, &entry.ept).await {
                    tracing::warn!(ep = %entry.ep, error = %e, "failed to create shadow for new registration");
                }
            }
        }
        if let Some(entries) = &event.reg_updates {
            for entry in entries {
                if let Err(e) = self.processor.create_shadow(&entry.ep, &entry.ept).await {
                    tracing::warn!(ep = %entry.ep, error = %e, "failed to refresh shadow for re-registration");
                }
            }
        }

        if let Some(eps) = &event.de_registrations {
            for ep in eps {
                if let Err(e) = self.processor.delete_shadow(ep).await {
                    tracing::warn!(ep = %ep, error = %e, "failed to delete shadow on deregistration");
                }
            }
        }
        if let Some(eps) = &event.registrations_expired {
            for ep in eps {
                if let Err(e) = self.processor.delete_shadow(ep).await {
                    tracing::warn!(ep = %ep, error = %e, "failed to delete shadow on registration expiry");
                }
            }
        }

        if let Err(e) = self.processor.handle_backend_event(&event).await {
            tracing::warn!(error = %e, "backend event handling failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_core::Orchestrator;
    use bridge_peers::{GenericBrokerProcessor, GenericConfig};
    use bridge_transport::MqttConfig;

    fn test_config() -> GenericConfig {
        GenericConfig {
            mqtt: MqttConfig {
                mqtt_address: "localhost".to_string(),
                mqtt_port: 1883,
                use_tls: false,
                client_cert_path: String::new(),
                client_key_path: String::new(),
                ca_cert_path: String::new(),
                keepalive_secs: 30,
                mqtt_clean_session: true,
                mqtt_reconnect_sleep_time_ms: 1000,
            },
            mqtt_mds_topic_root: "bridge".to_string(),
            mqtt_request_tag: "req".to_string(),
            mqtt_device_domain: "acme".to_string(),
            mqtt_device_data_key: None,
        }
    }

    struct NoopOrchestrator;

    #[async_trait]
    impl Orchestrator for NoopOrchestrator {
        async fn process_api_request_operation(
            &self,
            _request: &bridge_protocol::ApiRequest,
        ) -> bridge_core::OrchestratorApiResult {
            bridge_core::OrchestratorApiResult { status: 200, body: serde_json::Value::Null }
        }
        async fn process_endpoint_resource_operation(&self, _command: &bridge_protocol::CoapCommand) -> serde_json::Value {
            serde_json::Value::Null
        }
        async fn subscribe_to_endpoint_resource(&self, _key: &bridge_protocol::SubscriptionKey) -> bool {
            true
        }
        async fn pull_device_metadata(&self, _ep_name: &str) -> Option<serde_json::Value> {
            None
        }
    }

    #[test]
    fn handler_constructs_over_any_peer_processor() {
        let processor: Arc<dyn PeerProcessor> =
            Arc::new(GenericBrokerProcessor::new(test_config(), Arc::new(NoopOrchestrator), true));
        let _handler = GatewayEventHandler::new(processor);
    }
}
