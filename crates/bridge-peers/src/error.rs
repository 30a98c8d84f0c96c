//! Peer-processor errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PeerError {
    #[error(transparent)]
    Bridge(#[from] bridge_core::BridgeError),

    #[error(transparent)]
    Transport(#[from] bridge_transport::TransportError),

    #[error(transparent)]
    Credential(#[from] bridge_credentials::CredentialError),

    #[error("unknown device: {0}")]
    UnknownDevice(String),

    #[error("device already connected: {0}")]
    AlreadyConnected(String),
}

pub type PeerResult<T> = Result<T, PeerError>;
