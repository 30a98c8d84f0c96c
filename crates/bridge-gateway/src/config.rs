//! Gateway configuration, loadable from TOML (spec.md §6).

use bridge_peers::{GenericConfig, GoogleConfig, WatsonConfig};
use serde::Deserialize;

/// Which peer cloud this instance of the bridge talks to. A single process
/// runs exactly one, matching the reference workspace's one-binary-one-role
/// deployment shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerKind {
    Google,
    Watson,
    Generic,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub backend_base_url: String,
    #[serde(default)]
    pub backend_api_key: Option<String>,
    #[serde(default = "default_backend_timeout_secs")]
    pub backend_timeout_secs: u64,
    #[serde(default = "default_poll_path")]
    pub backend_poll_path: String,
}

fn default_backend_timeout_secs() -> u64 {
    30
}

fn default_poll_path() -> String {
    "/notification/pull".to_string()
}

/// Top-level gateway configuration. Exactly one of `google`/`watson`/
/// `generic` must be present, matching `active_peer`.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    pub active_peer: PeerKind,
    pub backend: BackendConfig,
    #[serde(default = "default_true")]
    pub auto_subscribe: bool,
    #[serde(default = "default_max_shadows")]
    pub max_shadows: usize,
    #[serde(default)]
    pub google: Option<GoogleConfig>,
    #[serde(default)]
    pub watson: Option<WatsonConfig>,
    #[serde(default)]
    pub generic: Option<GenericConfig>,
}

fn default_true() -> bool {
    true
}

fn default_max_shadows() -> usize {
    100_000
}

impl BridgeConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let present = match self.active_peer {
            PeerKind::Google => self.google.is_some(),
            PeerKind::Watson => self.watson.is_some(),
            PeerKind::Generic => self.generic.is_some(),
        };
        if !present {
            anyhow::bail!(
                "active_peer is {:?} but its configuration section is missing",
                self.active_peer
            );
        }
        Ok(())
    }
}
