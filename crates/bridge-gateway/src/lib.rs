//! Device-cloud bridge gateway: configuration, the HTTP-backed orchestrator,
//! and the long-poll-to-peer-processor dispatch wiring. The binary in
//! `main.rs` is a thin composition root over this library.

pub mod config;
pub mod dispatch;
pub mod orchestrator;

pub use config::{BackendConfig, BridgeConfig, PeerKind};
pub use dispatch::GatewayEventHandler;
pub use orchestrator::HttpOrchestrator;
