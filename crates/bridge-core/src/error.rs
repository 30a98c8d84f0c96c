//! Bridge error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("transport error: {0}")]
    Transport(#[from] bridge_transport::TransportError),

    #[error("backend rejected the operation: {0}")]
    BackendRejection(String),

    #[error("decode error: {0}")]
    Decode(String),
}

pub type BridgeResult<T> = Result<T, BridgeError>;
