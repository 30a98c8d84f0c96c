//! Cloud-agnostic bridge core: the generic MQTT processor, endpoint
//! registry, subscription manager, async-response correlator, and backend
//! event handlers every per-cloud processor in `bridge-peers` builds on.

pub mod backend;
pub mod correlator;
pub mod error;
pub mod hooks;
pub mod ids;
pub mod json_coerce;
pub mod orchestrator;
pub mod processor;
pub mod registry;
pub mod subscriptions;

pub use correlator::{AsyncResponseCorrelator, format_async_response_as_reply};
pub use error::{BridgeError, BridgeResult};
pub use hooks::{PeerHooks, SessionTopology};
pub use ids::ApiRequestIdSequencer;
pub use orchestrator::{Orchestrator, OrchestratorApiResult, is_async_response};
pub use processor::{DraftRewrite, GenericMqttProcessor, UNCONFIGURED_HOST_SENTINEL};
pub use registry::EndpointRegistry;
pub use subscriptions::SubscriptionManager;
