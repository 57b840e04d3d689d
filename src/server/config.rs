/**
 * Server Configuration
 *
 * Environment-driven configuration for the chat server. Every value has
 * a local-development default; a malformed variable is logged and falls
 * back to the default rather than aborting startup. Presence is the one
 * genuinely optional piece: with no broker configured the server simply
 * runs without it.
 */
use std::time::Duration;

use crate::presence::PresenceConfig;

/// Default listen port
const DEFAULT_PORT: u16 = 5000;
/// Default notification heartbeat period in seconds
const DEFAULT_HEARTBEAT_SECS: u64 = 30;
/// Default per-connection outbound queue depth
const DEFAULT_CONNECTION_BUFFER: usize = 64;

/// Runtime configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// TCP port the HTTP server binds
    pub port: u16,
    /// Period between SSE heartbeat events
    pub heartbeat_interval: Duration,
    /// Outbound queue depth per WebSocket connection
    pub connection_buffer: usize,
    /// Presence bridge settings, `None` when presence is disabled
    pub presence: Option<PresenceConfig>,
}

impl ServerConfig {
    /// Load configuration from the environment
    ///
    /// Reads `SERVER_PORT`, `HEARTBEAT_SECS`, `CONNECTION_BUFFER`, and
    /// (through [`PresenceConfig::from_env`]) `MQTT_BROKER_URL`.
    pub fn from_env() -> Self {
        let presence = PresenceConfig::from_env();
        if presence.is_none() {
            tracing::warn!("[Config] MQTT_BROKER_URL not set, presence updates disabled");
        }
        Self {
            port: env_parsed("SERVER_PORT", DEFAULT_PORT),
            heartbeat_interval: Duration::from_secs(env_parsed(
                "HEARTBEAT_SECS",
                DEFAULT_HEARTBEAT_SECS,
            )),
            connection_buffer: env_parsed("CONNECTION_BUFFER", DEFAULT_CONNECTION_BUFFER),
            presence,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
            connection_buffer: DEFAULT_CONNECTION_BUFFER,
            presence: None,
        }
    }
}

/// Read and parse an environment variable, logging on bad values
fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("[Config] Ignoring unparseable {}='{}'", name, raw);
                default
            }
        },
        Err(_) => default,
    }
}
