//! Presence
//!
//! Optional MQTT-backed presence relay. When a broker is configured the
//! bridge subscribes to per-user status topics and fans each update out
//! to every live chat connection.

/// MQTT client and relay loop
pub mod bridge;

pub use bridge::{PresenceBridge, PresenceConfig};
