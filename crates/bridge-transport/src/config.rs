//! MQTT connection configuration, loadable from TOML or environment
//! (spec.md §6: `mqtt_address`, `mqtt_port`, `mqtt_reconnect_sleep_time_ms`,
//! `mqtt_clean_session`).

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct MqttConfig {
    pub mqtt_address: String,
    #[serde(default = "default_port")]
    pub mqtt_port: u16,
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,
    #[serde(default)]
    pub client_cert_path: String,
    #[serde(default)]
    pub client_key_path: String,
    #[serde(default)]
    pub ca_cert_path: String,
    #[serde(default = "default_keepalive")]
    pub keepalive_secs: u16,
    #[serde(default = "default_clean_session")]
    pub mqtt_clean_session: bool,
    #[serde(default = "default_reconnect_sleep_ms")]
    pub mqtt_reconnect_sleep_time_ms: u64,
}

fn default_use_tls() -> bool {
    true
}

fn default_port() -> u16 {
    8883
}

fn default_keepalive() -> u16 {
    30
}

fn default_clean_session() -> bool {
    true
}

fn default_reconnect_sleep_ms() -> u64 {
    5_000
}
