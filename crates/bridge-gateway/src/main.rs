//! Device-cloud bridge — binary entry point.
//!
//! Loads configuration, builds the HTTP orchestrator and the one active
//! peer processor, then races the backend long-poll loop against a shutdown
//! signal.

use std::sync::Arc;

use bridge_gateway::config::{BridgeConfig, PeerKind};
use bridge_gateway::{GatewayEventHandler, HttpOrchestrator};
use bridge_longpoll::{LongPollConfig, LongPollReader};
use bridge_peers::{GenericBrokerProcessor, GoogleProcessor, PeerProcessor, WatsonProcessor};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "bridge-gateway starting");

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/bridge/gateway.toml".to_string());
    let config = BridgeConfig::from_file(&config_path)?;
    tracing::info!(active_peer = ?config.active_peer, "config loaded");

    let orchestrator: Arc<dyn bridge_core::Orchestrator> = Arc::new(HttpOrchestrator::new(&config.backend)?);

    let processor: Arc<dyn PeerProcessor> = match config.active_peer {
        PeerKind::Google => {
            let google_config = config
                .google
                .clone()
                .expect("validated at load time: google section present");
            Arc::new(GoogleProcessor::new(google_config, orchestrator, config.auto_subscribe)?)
        }
        PeerKind::Watson => {
            let watson_config = config
                .watson
                .clone()
                .expect("validated at load time: watson section present");
            Arc::new(WatsonProcessor::new(watson_config, orchestrator, config.auto_subscribe))
        }
        PeerKind::Generic => {
            let generic_config = config
                .generic
                .clone()
                .expect("validated at load time: generic section present");
            Arc::new(GenericBrokerProcessor::new(generic_config, orchestrator, config.auto_subscribe))
        }
    };

    let long_poll_config = LongPollConfig {
        backend_url: config.backend.backend_base_url.clone(),
        backend_poll_path: config.backend.backend_poll_path.clone(),
        backend_api_key: config.backend.backend_api_key.clone(),
        backend_timeout_secs: config.backend.backend_timeout_secs,
    };
    let handler = Arc::new(GatewayEventHandler::new(processor));
    let reader = LongPollReader::new(long_poll_config, handler)?;

    tracing::info!("bridge-gateway ready");

    tokio::select! {
        () = reader.run() => {
            tracing::error!("long-poll loop exited unexpectedly");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    tracing::info!("bridge-gateway stopped");
    Ok(())
}
