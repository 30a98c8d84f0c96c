//! The backend event envelope — the top-level shape of every long-poll
//! response body (spec.md §6).

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// A single device notification: an observed resource's new value, base64
/// encoded, as the backend emits it (spec.md §6: `{ep, path, payload(base64), id?}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEntry {
    pub ep: String,
    pub path: String,
    pub payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Some backends encode `obs` as a native JSON bool, others as the literal
/// string `"true"`/`"false"` (spec.md §8 scenario 1). Accept both on read;
/// this program always emits a native bool.
fn deserialize_obs<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::String(s) if s == "true" => Ok(true),
        BoolOrString::String(s) if s == "false" => Ok(false),
        BoolOrString::String(s) => Err(D::Error::custom(format!("invalid value for obs: {s:?}"))),
    }
}

/// One resource a registration (or re-registration) announces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub path: String,
    #[serde(default, deserialize_with = "deserialize_obs")]
    pub obs: bool,
}

/// A single registration or re-registration entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationEntry {
    pub ep: String,
    pub ept: String,
    #[serde(default)]
    pub resources: Vec<ResourceDescriptor>,
}

/// The full top-level envelope the backend long-poll emits. Every key is
/// optional — a given poll response carries only the event categories that
/// actually occurred (spec.md §6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<Vec<NotificationEntry>>,
    #[serde(rename = "reg-updates", default, skip_serializing_if = "Option::is_none")]
    pub reg_updates: Option<Vec<RegistrationEntry>>,
    #[serde(rename = "de-registrations", default, skip_serializing_if = "Option::is_none")]
    pub de_registrations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registrations: Option<Vec<RegistrationEntry>>,
    #[serde(
        rename = "registrations-expired",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub registrations_expired: Option<Vec<String>>,
}

impl BackendEvent {
    pub fn is_empty(&self) -> bool {
        self.notifications.is_none()
            && self.reg_updates.is_none()
            && self.de_registrations.is_none()
            && self.registrations.is_none()
            && self.registrations_expired.is_none()
    }
}
