//! TLS transport policy.
//!
//! Every peer cloud in spec.md §6 requires TLS; the generic-broker variant
//! is the only one that may legitimately run plaintext (local/dev brokers).

use rumqttc::Transport;

use crate::config::MqttConfig;
use crate::error::{TransportError, TransportResult};

/// Build a TLS transport from certificate file paths in the config.
///
/// Uses `TlsConfiguration::Simple`, reading PEM-encoded client cert, client
/// key, and CA cert from disk.
pub fn load_tls_transport(config: &MqttConfig) -> TransportResult<Transport> {
    let ca = std::fs::read(&config.ca_cert_path).map_err(|e| {
        TransportError::Tls(format!(
            "failed to read CA cert '{}': {e}",
            config.ca_cert_path
        ))
    })?;

    let client_cert = std::fs::read(&config.client_cert_path).map_err(|e| {
        TransportError::Tls(format!(
            "failed to read client cert '{}': {e}",
            config.client_cert_path
        ))
    })?;

    let client_key = std::fs::read(&config.client_key_path).map_err(|e| {
        TransportError::Tls(format!(
            "failed to read client key '{}': {e}",
            config.client_key_path
        ))
    })?;

    Ok(Transport::tls_with_config(
        rumqttc::TlsConfiguration::Simple {
            ca,
            alpn: None,
            client_auth: Some((client_cert, client_key)),
        },
    ))
}

/// TLS transport for clouds that authenticate over the MQTT `CONNECT`
/// packet (username/password or JWT-as-password) rather than mTLS — the CA
/// is still pinned, but no client certificate is presented.
pub fn load_server_auth_transport(config: &MqttConfig) -> TransportResult<Transport> {
    let ca = std::fs::read(&config.ca_cert_path).map_err(|e| {
        TransportError::Tls(format!(
            "failed to read CA cert '{}': {e}",
            config.ca_cert_path
        ))
    })?;

    Ok(Transport::tls_with_config(
        rumqttc::TlsConfiguration::Simple {
            ca,
            alpn: None,
            client_auth: None,
        },
    ))
}

pub fn plaintext_transport() -> Transport {
    Transport::Tcp
}
