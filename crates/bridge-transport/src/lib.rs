//! MQTT channel abstraction, TLS policy, and JWT minting.
//!
//! Peer processors in `bridge-peers` depend on this crate for the actual
//! network edge — they never touch `rumqttc` directly.

pub mod channel;
pub mod config;
pub mod error;
pub mod jwt;
pub mod mock;
pub mod tls;

pub use channel::{Channel, MqttChannel};
pub use config::MqttConfig;
pub use error::{TransportError, TransportResult};
pub use mock::MockChannel;
