//! MQTT channel — async client wrapper over `rumqttc`.

use async_trait::async_trait;
use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};

use crate::config::MqttConfig;
use crate::error::{TransportError, TransportResult};
use crate::tls;

/// Abstraction for MQTT publish/subscribe, mockable in tests.
///
/// Every peer processor talks to its session through this trait rather than
/// `rumqttc::AsyncClient` directly, so `bridge-e2e-tests` can run the whole
/// subsystem against `MockChannel` without a broker.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn publish(&self, topic: &str, payload: &[u8], qos: QoS) -> TransportResult<()>;
    async fn subscribe(&self, filter: &str, qos: QoS) -> TransportResult<()>;
    async fn unsubscribe(&self, filter: &str) -> TransportResult<()>;

    /// Force-close the session (spec.md §5 cancellation: `disconnect(force=true)`).
    async fn disconnect(&self) -> TransportResult<()>;
}

/// One MQTT session. Google's topology creates one of these per device;
/// Watson and the generic-broker variants share a single session across all
/// devices in a domain (spec.md §4.2) — which topology a given processor
/// uses is a `bridge-peers` decision, not this type's.
pub struct MqttChannel {
    client: AsyncClient,
    session_id: String,
}

impl MqttChannel {
    /// Connect with mutual TLS (client certificate auth).
    ///
    /// Returns `(channel, event_loop)`; the caller must drive the event loop
    /// in a spawned task:
    /// ```ignore
    /// tokio::spawn(async move {
    ///     loop {
    ///         if let Err(e) = eventloop.poll().await {
    ///             tracing::warn!(error = %e, "mqtt event loop error");
    ///             tokio::time::sleep(Duration::from_millis(config.mqtt_reconnect_sleep_time_ms)).await;
    ///         }
    ///     }
    /// });
    /// ```
    pub fn connect_mtls(
        config: &MqttConfig,
        client_id: &str,
        session_id: impl Into<String>,
    ) -> TransportResult<(Self, EventLoop)> {
        let transport = tls::load_tls_transport(config)?;
        Self::connect_with_transport(config, client_id, session_id, transport, None)
    }

    /// Connect with server-auth TLS and a username/password (or JWT-as-
    /// password) pair presented on the `CONNECT` packet.
    pub fn connect_with_password(
        config: &MqttConfig,
        client_id: &str,
        session_id: impl Into<String>,
        username: &str,
        password: &str,
    ) -> TransportResult<(Self, EventLoop)> {
        let transport = if config.use_tls {
            tls::load_server_auth_transport(config)?
        } else {
            tls::plaintext_transport()
        };
        Self::connect_with_transport(
            config,
            client_id,
            session_id,
            transport,
            Some((username, password)),
        )
    }

    fn connect_with_transport(
        config: &MqttConfig,
        client_id: &str,
        session_id: impl Into<String>,
        transport: rumqttc::Transport,
        credentials: Option<(&str, &str)>,
    ) -> TransportResult<(Self, EventLoop)> {
        let mut options = MqttOptions::new(client_id, &config.mqtt_address, config.mqtt_port);
        options.set_keep_alive(std::time::Duration::from_secs(config.keepalive_secs.into()));
        options.set_clean_session(config.mqtt_clean_session);
        options.set_transport(transport);
        if let Some((user, pass)) = credentials {
            options.set_credentials(user, pass);
        }

        let (client, eventloop) = AsyncClient::new(options, 64);
        Ok((
            Self {
                client,
                session_id: session_id.into(),
            },
            eventloop,
        ))
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

#[async_trait]
impl Channel for MqttChannel {
    async fn publish(&self, topic: &str, payload: &[u8], qos: QoS) -> TransportResult<()> {
        self.client
            .publish(topic, qos, false, payload)
            .await
            .map_err(|e| TransportError::Publish(e.to_string()))
    }

    async fn subscribe(&self, filter: &str, qos: QoS) -> TransportResult<()> {
        self.client
            .subscribe(filter, qos)
            .await
            .map_err(|e| TransportError::Subscribe(e.to_string()))
    }

    async fn unsubscribe(&self, filter: &str) -> TransportResult<()> {
        self.client
            .unsubscribe(filter)
            .await
            .map_err(|e| TransportError::Unsubscribe(e.to_string()))
    }

    async fn disconnect(&self) -> TransportResult<()> {
        self.client
            .disconnect()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))
    }
}
