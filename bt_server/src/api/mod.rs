//! HTTP/WebSocket API for the blackjack server.
//!
//! # Endpoints Overview
//!
//! ## Users
//! - `POST /api/users` - Provision a user with a display name and avatar
//!
//! ## Rooms
//! - `GET /api/rooms` - List live rooms
//! - `POST /api/rooms` - Spawn a new room
//!
//! ## WebSocket
//! - `GET /ws/{room_id}?user_id=<uuid>` - Join a room and play
//!
//! ## Health Check
//! - `GET /health` - Server health status
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use blackjack_table::{RoomConfig, RoomManager, accounts::InMemoryAccounts};
//! use bt_server::api::{AppState, create_router};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let accounts = Arc::new(InMemoryAccounts::new(500));
//! let room_manager = Arc::new(RoomManager::new(accounts.clone(), RoomConfig::default()));
//! let app = create_router(AppState { room_manager, accounts });
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod rooms;
pub mod users;
pub mod websocket;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use blackjack_table::{RoomError, RoomManager, accounts::InMemoryAccounts};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers and WebSocket connections.
///
/// Cloned per request; both fields are `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub room_manager: Arc<RoomManager>,
    pub accounts: Arc<InMemoryAccounts>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error half of every handler's return type
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

impl From<RoomError> for ErrorResponse {
    fn from(err: RoomError) -> Self {
        Self {
            error: err.client_message(),
        }
    }
}

pub(crate) fn room_error(err: RoomError) -> ApiError {
    let status = match &err {
        RoomError::RoomNotFound(_) => StatusCode::NOT_FOUND,
        RoomError::RoomClosed => StatusCode::GONE,
        _ if err.is_invalid_action() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse::from(err)))
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/users", post(users::create_user))
        .route(
            "/api/rooms",
            get(rooms::list_rooms).post(rooms::create_room),
        )
        .route("/ws/{room_id}", get(websocket::websocket_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Reports the number of live rooms.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let room_count = state.room_manager.active_room_count().await;

    let response = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "rooms": room_count,
    });

    (StatusCode::OK, Json(response))
}
