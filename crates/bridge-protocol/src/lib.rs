//! Shared types for the device-cloud bridge.
//!
//! Covers the backend-side data model (endpoints, topic sets, subscriptions,
//! credentials) and the wire envelopes exchanged with both the backend
//! (LwM2M/CoAP notifications) and the peer clouds (MQTT observations, API
//! requests, async responses).

pub mod async_record;
pub mod backend_event;
pub mod coap;
pub mod credential;
pub mod endpoint;
pub mod observation;
pub mod request;
pub mod topics;

pub use async_record::AsyncRecord;
pub use backend_event::{BackendEvent, NotificationEntry, RegistrationEntry, ResourceDescriptor};
pub use coap::{CoapCommand, CoapVerb};
pub use credential::Credential;
pub use endpoint::{Endpoint, SubscriptionKey, TopicSet, TopicVerb};
pub use observation::ObservationPayload;
pub use request::{ApiRequest, ApiResponse};
