/**
 * Presence Bridge
 *
 * MQTT relay for user presence. An external presence system publishes
 * retained-free `online`/`offline` payloads to `users/{id}/status`; the
 * bridge subscribes with a wildcard and relays each update to every
 * live connection as a `userStatus` event. Presence is global, not
 * room-scoped.
 *
 * The bridge holds no state of its own. Upstream failures are logged
 * and retried with a fixed delay; they never surface to chat clients.
 */
use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, Incoming, MqttOptions, Publish, QoS};

use crate::hub::ConnectionHub;
use crate::shared::{PresenceStatus, ServerEvent};

/// Wildcard subscription covering every user's status topic
const STATUS_TOPIC: &str = "users/+/status";

/// Presence bridge configuration
///
/// Read from the environment at startup. Presence is optional: with no
/// broker configured the server runs without it.
#[derive(Clone, Debug)]
pub struct PresenceConfig {
    /// Broker host
    pub broker_host: String,
    /// Broker port
    pub broker_port: u16,
    /// MQTT client id for this server instance
    pub client_id: String,
    /// Keep-alive interval
    pub keep_alive: Duration,
    /// Delay before retrying after an event-loop error
    pub reconnect_delay: Duration,
}

impl PresenceConfig {
    /// Read the bridge configuration from the environment
    ///
    /// Returns `None` when `MQTT_BROKER_URL` is unset, which disables
    /// presence entirely. The URL accepts `mqtt://host:port`, `host:port`,
    /// or a bare host (port defaults to 1883).
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("MQTT_BROKER_URL").ok()?;
        let (broker_host, broker_port) = parse_broker_url(&url);
        Some(Self {
            broker_host,
            broker_port,
            client_id: format!("wavechat-presence-{}", uuid::Uuid::new_v4()),
            keep_alive: Duration::from_secs(60),
            reconnect_delay: Duration::from_secs(5),
        })
    }
}

/// Split a broker URL into host and port
fn parse_broker_url(url: &str) -> (String, u16) {
    let stripped = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url);
    match stripped.rsplit_once(':') {
        Some((host, port)) => match port.parse() {
            Ok(port) => (host.to_string(), port),
            Err(_) => (stripped.to_string(), 1883),
        },
        None => (stripped.to_string(), 1883),
    }
}

/// Extract the user id from a `users/{id}/status` topic
fn extract_user_id(topic: &str) -> Option<&str> {
    let mut parts = topic.split('/');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("users"), Some(id), Some("status"), None) if !id.is_empty() => Some(id),
        _ => None,
    }
}

/// Relays presence updates from the MQTT broker to the hub
pub struct PresenceBridge {
    client: AsyncClient,
    eventloop: EventLoop,
    hub: Arc<ConnectionHub>,
    config: PresenceConfig,
}

impl PresenceBridge {
    /// Create a bridge; no network traffic happens until [`run`](Self::run)
    pub fn new(config: PresenceConfig, hub: Arc<ConnectionHub>) -> Self {
        let mut options = MqttOptions::new(
            config.client_id.clone(),
            config.broker_host.clone(),
            config.broker_port,
        );
        options.set_keep_alive(config.keep_alive);
        let (client, eventloop) = AsyncClient::new(options, 16);
        Self {
            client,
            eventloop,
            hub,
            config,
        }
    }

    /// Drive the bridge; runs until the process exits
    ///
    /// Spawned as a background task at startup. The subscription is
    /// (re)issued on every `ConnAck` so it survives reconnects.
    ///
    /// The event loop is moved out of `self` up front: it is not `Sync`,
    /// and the spawned future must not borrow it across await points.
    pub async fn run(self) {
        let Self {
            client,
            mut eventloop,
            hub,
            config,
        } = self;
        tracing::info!(
            "[Presence] Bridge starting against {}:{}",
            config.broker_host,
            config.broker_port
        );
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Incoming::ConnAck(_))) => {
                    tracing::info!("[Presence] Connected, subscribing to {}", STATUS_TOPIC);
                    if let Err(e) = client.subscribe(STATUS_TOPIC, QoS::AtLeastOnce).await {
                        tracing::error!("[Presence] Subscribe failed: {}", e);
                    }
                }
                Ok(Event::Incoming(Incoming::Publish(publish))) => {
                    handle_publish(&hub, publish).await;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        "[Presence] Connection error: {}, retrying in {:?}",
                        e,
                        config.reconnect_delay
                    );
                    tokio::time::sleep(config.reconnect_delay).await;
                }
            }
        }
    }
}

/// Relay a single status publish to every live connection
async fn handle_publish(hub: &Arc<ConnectionHub>, publish: Publish) {
    let Some(user_id) = extract_user_id(&publish.topic) else {
        tracing::debug!("[Presence] Ignoring unexpected topic {}", publish.topic);
        return;
    };
    let payload = String::from_utf8_lossy(&publish.payload);
    let Some(status) = PresenceStatus::parse(payload.trim()) else {
        tracing::debug!(
            "[Presence] Ignoring unknown status '{}' for user {}",
            payload,
            user_id
        );
        return;
    };
    tracing::debug!("[Presence] User {} is {:?}", user_id, status);
    hub.broadcast_all(ServerEvent::UserStatus {
        user_id: user_id.to_string(),
        status,
    })
    .await;
}
