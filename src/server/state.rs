/**
 * Application State
 *
 * Central state container for the Axum application, plus the `FromRef`
 * implementations that let handlers extract just the piece they need.
 *
 * # Thread Safety
 *
 * Every field is an `Arc` over something internally synchronized: the
 * registry behind a `tokio::sync::RwLock`, the hub and notification
 * channel with their own internal locking, and the identity seam as a
 * shared trait object.
 */
use std::sync::Arc;

use axum::extract::FromRef;
use tokio::sync::RwLock;

use crate::hub::ConnectionHub;
use crate::identity::Identity;
use crate::notify::NotificationChannel;
use crate::rooms::RoomRegistry;
use crate::server::config::ServerConfig;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Room list and message histories
    pub registry: Arc<RwLock<RoomRegistry>>,
    /// Realtime fan-out core
    pub hub: Arc<ConnectionHub>,
    /// Per-user notification streams
    pub notifications: Arc<NotificationChannel>,
    /// Token verification seam
    pub identity: Arc<dyn Identity>,
    /// Runtime configuration
    pub config: Arc<ServerConfig>,
}

/// Allows handlers to extract the registry directly
impl FromRef<AppState> for Arc<RwLock<RoomRegistry>> {
    fn from_ref(state: &AppState) -> Self {
        state.registry.clone()
    }
}

/// Allows handlers to extract the hub directly
impl FromRef<AppState> for Arc<ConnectionHub> {
    fn from_ref(state: &AppState) -> Self {
        state.hub.clone()
    }
}

/// Allows handlers to extract the notification channel directly
impl FromRef<AppState> for Arc<NotificationChannel> {
    fn from_ref(state: &AppState) -> Self {
        state.notifications.clone()
    }
}
