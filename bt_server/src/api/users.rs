//! User provisioning handler.

use axum::{Json, extract::State, http::StatusCode};
use blackjack_table::{accounts::RoomId, game::entities::Chips};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApiError, AppState, api_error, room_error};

/// Longest accepted display name, in characters
pub const MAX_NAME_LENGTH: usize = 32;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub avatar: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
    pub balance: Chips,
    /// Room new users are pointed at
    pub room_id: RoomId,
}

/// Provision a user with the default balance.
///
/// # Response
///
/// `201 Created` with the new user and the main room's id:
/// ```json
/// {"id": "…", "name": "alice", "avatar": "fox", "balance": 500, "roomId": "a1B2c"}
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Empty or overlong name
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("Name must be at most {MAX_NAME_LENGTH} characters"),
        ));
    }

    let room_id = state.room_manager.main_room().await.map_err(room_error)?;
    let user = state.accounts.create_user(name, &request.avatar).await;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user.id,
            name: user.name,
            avatar: user.avatar,
            balance: user.balance,
            room_id,
        }),
    ))
}
