//! Per-cloud MQTT processors built on `bridge-core`'s generic processor
//! (spec.md §4.2, §9). Each cloud owns a `PeerHooks` implementation (topic
//! templating, envelope policy, command decoding) and a `PeerProcessor`
//! implementation (connection lifecycle, shadow management, credential
//! refresh).

pub mod config;
pub mod error;
pub mod generic;
pub mod google;
pub mod processor;
pub mod watson;

pub use config::{GenericConfig, GoogleConfig, WatsonConfig};
pub use error::{PeerError, PeerResult};
pub use generic::{GenericBrokerHooks, GenericBrokerProcessor};
pub use google::{GoogleHooks, GoogleProcessor};
pub use processor::PeerProcessor;
pub use watson::{WatsonHooks, WatsonProcessor};
