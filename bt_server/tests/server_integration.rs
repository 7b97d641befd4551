//! Integration tests for the HTTP surface of the server.
//!
//! Tests user provisioning, room discovery and creation, and error responses.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use blackjack_table::{RoomConfig, RoomManager, accounts::InMemoryAccounts};
use bt_server::api::{AppState, create_router};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot` method

/// Helper to create test server with managers
fn create_test_server() -> (axum::Router, Arc<RoomManager>, Arc<InMemoryAccounts>) {
    let accounts = Arc::new(InMemoryAccounts::new(500));
    let room_manager = Arc::new(RoomManager::new(accounts.clone(), RoomConfig::default()));

    let app = create_router(AppState {
        room_manager: room_manager.clone(),
        accounts: accounts.clone(),
    });

    (app, room_manager, accounts)
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let (app, room_manager, _) = create_test_server();
    room_manager.create_room().await.unwrap();

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["rooms"], 1);
}

// ============================================================================
// User Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_create_user_endpoint() {
    let (app, _, accounts) = create_test_server();

    let response = app
        .oneshot(post_json(
            "/api/users",
            json!({"name": "  alice ", "avatar": "fox"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["name"], "alice");
    assert_eq!(body["avatar"], "fox");
    assert_eq!(body["balance"], 500);
    assert_eq!(body["roomId"].as_str().unwrap().len(), 5);

    let id = body["id"].as_str().unwrap().parse().unwrap();
    let stored = accounts.get_user(id).await.unwrap();
    assert_eq!(stored.name, "alice");
    assert!(!stored.online);
}

#[tokio::test]
async fn test_users_share_main_room() {
    let (app, room_manager, _) = create_test_server();

    let first = body_json(
        app.clone()
            .oneshot(post_json("/api/users", json!({"name": "alice", "avatar": "fox"})))
            .await
            .unwrap(),
    )
    .await;
    let second = body_json(
        app.oneshot(post_json("/api/users", json!({"name": "bob", "avatar": "owl"})))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(first["roomId"], second["roomId"]);
    assert_eq!(room_manager.active_room_count().await, 1);
}

#[tokio::test]
async fn test_create_user_rejects_bad_names() {
    let (app, _, _) = create_test_server();

    let response = app
        .clone()
        .oneshot(post_json("/api/users", json!({"name": "   ", "avatar": "fox"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("empty"));

    let response = app
        .oneshot(post_json(
            "/api/users",
            json!({"name": "x".repeat(40), "avatar": "fox"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_request() {
    let (app, _, _) = create_test_server();

    let request = Request::builder()
        .method("POST")
        .uri("/api/users")
        .header("content-type", "application/json")
        .body(Body::from("{invalid json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

// ============================================================================
// Room Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_create_and_list_rooms() {
    let (app, _, _) = create_test_server();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/rooms")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let room_id = created["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/rooms")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let rooms = body_json(response).await;
    let rooms = rooms.as_array().unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["id"], room_id.as_str());
    assert_eq!(rooms[0]["status"], "IDLE");
    assert_eq!(rooms[0]["seated"], 0);
}

#[tokio::test]
async fn test_closed_rooms_leave_the_listing() {
    let (app, room_manager, _) = create_test_server();
    let kept = room_manager.create_room().await.unwrap();
    let closed = room_manager.create_room().await.unwrap();
    room_manager.close_room(&closed).await.unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/rooms")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let rooms = body_json(response).await;
    let ids: Vec<&str> = rooms
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|room| room["id"].as_str())
        .collect();
    assert_eq!(ids, vec![kept.as_str()]);
}

// ============================================================================
// Routing Tests
// ============================================================================

#[tokio::test]
async fn test_404_for_invalid_endpoint() {
    let (app, _, _) = create_test_server();

    let request = Request::builder()
        .uri("/api/tables")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_websocket_route_requires_upgrade() {
    let (app, room_manager, accounts) = create_test_server();
    let room_id = room_manager.create_room().await.unwrap();
    let user = accounts.create_user("alice", "fox").await;

    let request = Request::builder()
        .uri(format!("/ws/{}?user_id={}", room_id, user.id))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_cors_headers_present() {
    let (app, _, _) = create_test_server();

    let request = Request::builder()
        .uri("/api/rooms")
        .header("origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}
