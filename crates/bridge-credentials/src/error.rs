//! Credential errors (spec.md §7: `CredentialExpired`/`Unauthorized`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential expired")]
    Expired,

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("token signing failed: {0}")]
    SignFailed(String),

    #[error(transparent)]
    Transport(#[from] bridge_transport::TransportError),
}

pub type CredentialResult<T> = Result<T, CredentialError>;
