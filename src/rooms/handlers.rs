/**
 * Room API Handlers
 *
 * Axum handlers for the room CRUD surface and the HTTP message API.
 *
 * # Endpoints
 *
 * - `POST /api/rooms` - create a room (authenticated)
 * - `GET /api/rooms` - list all rooms
 * - `GET /api/rooms/search?q=` - case-insensitive search over name and
 *   description
 * - `GET /api/rooms/{id}` - fetch one room
 * - `PUT /api/rooms/{id}` - update name and/or description (authenticated)
 * - `DELETE /api/rooms/{id}` - delete a room and its history (authenticated)
 * - `GET /api/messages?room=` - read a room's message history
 * - `POST /api/messages` - append a message and broadcast it to the
 *   room's live connections
 *
 * # Authentication
 *
 * Mutating room endpoints require an `Authorization: Bearer <token>`
 * header; the token is resolved through the [`Identity`] seam. Read
 * endpoints and the message API are open, matching the rest of the
 * public chat surface.
 */
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::identity::bearer_token;
use crate::server::state::AppState;
use crate::shared::message::ChatMessage;
use crate::shared::UserId;

use super::registry::Room;

/// Request body for POST /api/rooms
#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Request body for PUT /api/rooms/{id}
#[derive(Debug, Deserialize)]
pub struct UpdateRoomRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Response wrapper for mutations that return the affected room
#[derive(Debug, Serialize)]
pub struct RoomResponse {
    pub message: String,
    pub room: Room,
}

/// Query string for GET /api/rooms/search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Response for GET /api/rooms/search
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub count: usize,
    pub rooms: Vec<Room>,
}

/// Query string for GET /api/messages
#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub room: Option<String>,
}

/// Request body for POST /api/messages
#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub room: Option<String>,
    pub message: Option<String>,
    pub username: Option<String>,
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<UserId, ApiError> {
    let token = bearer_token(headers).ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;
    state
        .identity
        .authenticate(token)
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))
}

/// Create a room
///
/// # Returns
///
/// `201 Created` with the new room, or:
///
/// * `400 Bad Request` - missing or empty room name
/// * `401 Unauthorized` - missing or invalid bearer token
/// * `409 Conflict` - a room with this name already exists (names are
///   compared case-insensitively)
pub async fn create_room(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomResponse>), ApiError> {
    let user = authenticate(&state, &headers)?;
    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::validation("Room name is required"))?;
    let description = request.description.as_deref().unwrap_or("");

    let mut registry = state.registry.write().await;
    let room = registry.create(name, description, Some(user))?;
    tracing::info!("[Rooms] Created room '{}' (id {})", room.name, room.id);
    Ok((
        StatusCode::CREATED,
        Json(RoomResponse {
            message: "Room created successfully".to_string(),
            room,
        }),
    ))
}

/// List all rooms in creation order
pub async fn list_rooms(State(state): State<AppState>) -> Json<Vec<Room>> {
    let registry = state.registry.read().await;
    Json(registry.rooms().to_vec())
}

/// Search rooms by name or description
///
/// # Returns
///
/// The query echoed back, the match count, and the matching rooms in
/// creation order. `400 Bad Request` for a missing or blank query.
pub async fn search_rooms(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let q = query
        .q
        .as_deref()
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Search query is required"))?;

    let registry = state.registry.read().await;
    let rooms = registry.search(q);
    Ok(Json(SearchResponse {
        query: q.to_string(),
        count: rooms.len(),
        rooms,
    }))
}

/// Fetch a single room by id
pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Room>, ApiError> {
    let registry = state.registry.read().await;
    let room = registry
        .get(id)
        .ok_or_else(|| ApiError::not_found("Room not found"))?;
    Ok(Json(room.clone()))
}

/// Update a room's name and/or description
///
/// Renaming a room carries its message history over to the new name.
/// Fields absent from the body are left unchanged.
pub async fn update_room(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(request): Json<UpdateRoomRequest>,
) -> Result<Json<RoomResponse>, ApiError> {
    authenticate(&state, &headers)?;

    let mut registry = state.registry.write().await;
    let room = registry
        .update(id, request.name.as_deref(), request.description.as_deref())?;
    tracing::info!("[Rooms] Updated room id {}", id);
    Ok(Json(RoomResponse {
        message: "Room updated successfully".to_string(),
        room,
    }))
}

/// Delete a room and its message history
pub async fn delete_room(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    authenticate(&state, &headers)?;

    let mut registry = state.registry.write().await;
    registry.delete(id)?;
    tracing::info!("[Rooms] Deleted room id {}", id);
    Ok(Json(
        serde_json::json!({ "message": "Room deleted successfully" }),
    ))
}

/// Read a room's message history in arrival order
///
/// # Returns
///
/// * `400 Bad Request` - missing `room` query parameter
/// * `404 Not Found` - the room is not registered
pub async fn get_messages(
    State(state): State<AppState>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let room = query
        .room
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Room is required"))?;

    let registry = state.registry.read().await;
    let history = registry
        .history(room)
        .ok_or_else(|| ApiError::not_found("Room not found"))?;
    Ok(Json(history.to_vec()))
}

/// Append a message over HTTP and broadcast it to the room's connections
///
/// Server-side ingestion path: no live connection or room membership is
/// required, only that the room exists.
pub async fn post_message(
    State(state): State<AppState>,
    Json(request): Json<PostMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), ApiError> {
    let (Some(room), Some(text), Some(username)) = (
        request.room.as_deref(),
        request.message.as_deref(),
        request.username.as_deref(),
    ) else {
        return Err(ApiError::validation("Missing fields"));
    };

    let message = state.hub.publish(room, text, username).await?;
    Ok((StatusCode::CREATED, Json(message)))
}
