/**
 * Server Initialization
 *
 * Builds the application: seeds the room registry, wires the hub and
 * notification channel into the shared state, spawns the presence
 * bridge when a broker is configured, and assembles the router.
 *
 * # Initialization Process
 *
 * 1. Seed the registry with the default rooms
 * 2. Create the hub over the registry
 * 3. Create the notification channel and identity seam
 * 4. Spawn the presence bridge (if configured)
 * 5. Build the router over the assembled state
 */
use std::sync::Arc;

use axum::Router;
use tokio::sync::RwLock;

use crate::hub::ConnectionHub;
use crate::identity::TokenIdentity;
use crate::notify::NotificationChannel;
use crate::presence::PresenceBridge;
use crate::rooms::RoomRegistry;
use crate::routes::create_router;
use crate::server::config::ServerConfig;
use crate::server::state::AppState;

/// Create and configure the Axum application
///
/// Returns the router ready to serve. Presence runs as a detached
/// background task; a missing broker only disables presence and is
/// already logged by the configuration layer.
pub async fn create_app(config: ServerConfig) -> Router {
    tracing::info!("[Server] Initializing chat server");

    let registry = Arc::new(RwLock::new(RoomRegistry::with_default_rooms()));
    let hub = Arc::new(ConnectionHub::new(registry.clone(), config.connection_buffer));
    let notifications = Arc::new(NotificationChannel::new());

    if let Some(presence_config) = config.presence.clone() {
        let bridge = PresenceBridge::new(presence_config, hub.clone());
        tokio::spawn(bridge.run());
        tracing::info!("[Server] Presence bridge spawned");
    }

    let state = AppState {
        registry,
        hub,
        notifications,
        identity: Arc::new(TokenIdentity),
        config: Arc::new(config),
    };

    tracing::info!("[Server] State initialized, building router");
    create_router(state)
}
