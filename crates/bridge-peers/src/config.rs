//! Per-cloud configuration (spec.md §6).

use bridge_transport::MqttConfig;
use serde::Deserialize;

/// `google_cloud_*` keys.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub mqtt: MqttConfig,
    pub google_cloud_project_id: String,
    pub google_cloud_region: String,
    pub google_cloud_registry_name: String,
    /// PEM-encoded RSA private key used to sign per-device JWTs.
    pub google_cloud_jwt_private_key_path: String,
    #[serde(default = "default_jwt_ttl_secs")]
    pub google_cloud_jwt_ttl_secs: i64,
    #[serde(default = "default_refresh_slack_secs")]
    pub google_cloud_jwt_refresh_slack_secs: i64,
    #[serde(default = "default_max_retries")]
    pub google_cloud_jwt_max_retries: u32,
    #[serde(default = "default_retry_wait_ms")]
    pub google_cloud_jwt_retry_wait_ms: u64,
    /// How long a caller waits to acquire a device's creation lock before
    /// giving up (`google_wait_for_lock_ms`, spec.md §6).
    #[serde(default = "default_wait_for_lock_ms")]
    pub google_wait_for_lock_ms: u64,
}

/// `iotf_*` keys (IBM Watson IoT Platform).
#[derive(Debug, Clone, Deserialize)]
pub struct WatsonConfig {
    pub mqtt: MqttConfig,
    pub iotf_org_id: String,
    pub iotf_api_key: String,
    pub iotf_auth_token: String,
    #[serde(default)]
    pub iotf_default_device_type: String,
    /// Lower-cases the topic-space segments for tenants still running the
    /// legacy (pre-upgrade) topic layout; production tenants use the
    /// upper-case LwM2M verb segments. The two layouts must never overlap
    /// for the same organization.
    #[serde(default)]
    pub iotf_legacy_lowercase: bool,
    /// When set, the observation payload nests under this key instead of
    /// being published at the envelope's top level.
    #[serde(default)]
    pub iotf_data_key: Option<String>,
}

/// Generic-broker (`mqtt_mds_topic_root` family) configuration, covering
/// Azure IoT Hub, AWS IoT, and plain brokers that don't need a bespoke
/// topic layout.
#[derive(Debug, Clone, Deserialize)]
pub struct GenericConfig {
    pub mqtt: MqttConfig,
    pub mqtt_mds_topic_root: String,
    #[serde(default = "default_request_tag")]
    pub mqtt_request_tag: String,
    pub mqtt_device_domain: String,
    #[serde(default)]
    pub mqtt_device_data_key: Option<String>,
}

fn default_jwt_ttl_secs() -> i64 {
    3600
}

fn default_refresh_slack_secs() -> i64 {
    600
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_wait_ms() -> u64 {
    2_000
}

fn default_wait_for_lock_ms() -> u64 {
    10_000
}

fn default_request_tag() -> String {
    "req".to_string()
}
