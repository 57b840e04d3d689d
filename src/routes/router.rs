/**
 * Router Configuration
 *
 * Assembles every HTTP route into a single Axum router over the shared
 * application state.
 *
 * # Route Map
 *
 * ## Realtime
 *
 * - `GET /ws` - WebSocket chat protocol
 * - `GET /api/notifications/stream` - per-user SSE notification stream
 *
 * ## Rooms
 *
 * - `POST /api/rooms` - create (authenticated)
 * - `GET /api/rooms` - list
 * - `GET /api/rooms/search` - search by name or description
 * - `GET /api/rooms/{id}` - fetch
 * - `PUT /api/rooms/{id}` - update (authenticated)
 * - `DELETE /api/rooms/{id}` - delete (authenticated)
 *
 * ## Messages
 *
 * - `GET /api/messages` - room history snapshot
 * - `POST /api/messages` - append and broadcast
 *
 * Note that `/api/rooms/search` is registered before `/api/rooms/{id}`
 * so the literal segment wins over the id capture.
 */
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::chat::websocket_handler;
use crate::notify::handlers::notification_stream;
use crate::rooms::handlers::{
    create_room, delete_room, get_messages, get_room, list_rooms, post_message, search_rooms,
    update_room,
};
use crate::server::state::AppState;

/// Create the router with all routes configured
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/api/notifications/stream", get(notification_stream))
        .route("/api/rooms", post(create_room).get(list_rooms))
        .route("/api/rooms/search", get(search_rooms))
        .route(
            "/api/rooms/{id}",
            get(get_room).put(update_room).delete(delete_room),
        )
        .route("/api/messages", get(get_messages).post(post_message))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
