//! Room discovery and creation handlers.
//!
//! List rooms:
//! ```bash
//! curl http://localhost:6969/api/rooms
//! ```

use axum::{Json, extract::State, http::StatusCode};
use blackjack_table::room::RoomMetadata;
use serde::Serialize;

use super::{ApiError, AppState, room_error};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRoom {
    pub id: String,
}

/// List all live rooms, ordered by id.
pub async fn list_rooms(State(state): State<AppState>) -> Json<Vec<RoomMetadata>> {
    Json(state.room_manager.list_rooms().await)
}

/// Spawn a new room with the server's room configuration.
///
/// # Response
///
/// `201 Created` with `{"id": "<room id>"}`.
pub async fn create_room(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CreatedRoom>), ApiError> {
    let id = state.room_manager.create_room().await.map_err(room_error)?;
    Ok((StatusCode::CREATED, Json(CreatedRoom { id })))
}
