//! Room API integration tests
//!
//! Exercises the HTTP surface end to end through the assembled router:
//! CRUD status codes, auth, search, and the message endpoints.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use wavechat::server::{create_app, ServerConfig};

async fn test_app() -> Router {
    create_app(ServerConfig::default()).await
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = auth {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_default_rooms_are_seeded() {
    let app = test_app().await;
    let response = app.oneshot(get("/api/rooms")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let rooms = body_json(response).await;
    let names: Vec<&str> = rooms
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["General", "Random"]);
    assert_eq!(rooms[0]["id"], 1);
    assert_eq!(rooms[1]["id"], 2);
}

#[tokio::test]
async fn test_create_room_requires_auth() {
    let app = test_app().await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/rooms",
            None,
            json!({"name": "Gaming"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_room_lifecycle() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/rooms",
            Some("alice"),
            json!({"name": "Gaming", "description": "Video games"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Room created successfully");
    assert_eq!(body["room"]["id"], 3);
    assert_eq!(body["room"]["createdBy"], "alice");

    let response = app.clone().oneshot(get("/api/rooms/3")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "Gaming");

    // Duplicate name, different case.
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/rooms",
            Some("alice"),
            json!({"name": "gaming"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_room_requires_a_name() {
    let app = test_app().await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/rooms",
            Some("alice"),
            json!({"description": "nameless"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Room name is required");
}

#[tokio::test]
async fn test_search_matches_name_and_description() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/rooms/search?q=ran"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["query"], "ran");
    assert_eq!(body["count"], 1);
    assert_eq!(body["rooms"][0]["name"], "Random");

    let response = app.oneshot(get("/api/rooms/search")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rename_carries_history_over() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/messages",
            None,
            json!({"room": "General", "message": "hello", "username": "alice"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let posted = body_json(response).await;
    assert_eq!(posted["user"], "alice");
    assert_eq!(posted["text"], "hello");

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/rooms/1",
            Some("alice"),
            json!({"name": "Lobby"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["room"]["name"], "Lobby");
    assert!(body["room"]["updatedAt"].is_string());

    let response = app
        .clone()
        .oneshot(get("/api/messages?room=Lobby"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let history = body_json(response).await;
    assert_eq!(history[0]["text"], "hello");

    // The old name no longer resolves.
    let response = app.oneshot(get("/api/messages?room=General")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rename_collision_is_rejected() {
    let app = test_app().await;
    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/rooms/1",
            Some("alice"),
            json!({"name": "random"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_removes_room_and_history() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request("DELETE", "/api/rooms/2", Some("alice"), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Room deleted successfully");

    let response = app.clone().oneshot(get("/api/rooms/2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/api/messages?room=Random")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_room_id_is_not_found() {
    let app = test_app().await;
    let response = app.oneshot(get("/api/rooms/99")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Room not found");
}

#[tokio::test]
async fn test_messages_endpoint_validation() {
    let app = test_app().await;

    let response = app.clone().oneshot(get("/api/messages")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/messages",
            None,
            json!({"room": "General", "message": "no user"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Missing fields");

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/messages",
            None,
            json!({"room": "Nowhere", "message": "hi", "username": "alice"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_notification_stream_requires_a_token() {
    let app = test_app().await;
    let response = app
        .oneshot(get("/api/notifications/stream"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
