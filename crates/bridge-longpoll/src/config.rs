//! Backend long-poll configuration (spec.md §6).

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct LongPollConfig {
    pub backend_url: String,
    #[serde(default = "default_poll_path")]
    pub backend_poll_path: String,
    #[serde(default)]
    pub backend_api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub backend_timeout_secs: u64,
}

fn default_poll_path() -> String {
    "/notification/pull".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
