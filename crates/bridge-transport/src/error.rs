//! Transport error types.

use thiserror::Error;

/// Errors raised by the MQTT channel, TLS setup, or JWT minting.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect error: {0}")]
    Connect(String),

    #[error("publish error: {0}")]
    Publish(String),

    #[error("subscribe error: {0}")]
    Subscribe(String),

    #[error("unsubscribe error: {0}")]
    Unsubscribe(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("credential error: {0}")]
    Credential(String),
}

/// Convenience alias for transport results.
pub type TransportResult<T> = Result<T, TransportError>;
