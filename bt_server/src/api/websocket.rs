//! WebSocket handler for live room play.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws/{room_id}?user_id=<uuid>`
//! 2. Server checks the user and the room exist, then upgrades
//! 3. The user enters the room as a spectator and subscribes to its broadcasts
//! 4. A send task forwards `ROOM_STATE` frames and this connection's `REJECTED` replies
//! 5. On disconnect the user is marked offline once their last connection
//!    closes; a seated player keeps the seat
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:6969/ws/a1B2c?user_id=…');
//! ws.send(JSON.stringify({event: "PICK_SEAT", data: {userId: "…", seat: 1}}));
//! ```

use axum::{
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use blackjack_table::{
    accounts::{AccountService, UserProfile},
    net::{ClientMessage, ServerMessage},
    room::{ConnectionId, RoomError, RoomEvent, RoomHandle},
};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{AppState, room_error};

/// Pending `REJECTED` replies per connection
const REPLY_CAPACITY: usize = 32;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    user_id: Uuid,
}

/// Upgrade HTTP connection to WebSocket for a room.
///
/// # Response
///
/// On success, upgrades to WebSocket protocol (101 Switching Protocols).
/// Unknown users get `401 Unauthorized`, unknown rooms `404 Not Found`.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    let profile = match state.accounts.profile(query.user_id).await {
        Ok(profile) => profile,
        Err(_) => return (StatusCode::UNAUTHORIZED, "Unknown user").into_response(),
    };

    let handle = match state.room_manager.room(&room_id).await {
        Ok(handle) => handle,
        Err(err) => return room_error(err).into_response(),
    };

    let capacity = state.room_manager.config().subscriber_capacity;
    ws.on_upgrade(move |socket| handle_socket(socket, handle, profile, capacity))
}

/// Drive one established connection until either side goes away.
async fn handle_socket(
    socket: WebSocket,
    handle: RoomHandle,
    profile: UserProfile,
    capacity: usize,
) {
    let user_id = profile.id;
    let connection_id: ConnectionId = Uuid::new_v4();
    let room_id = handle.room_id().to_string();

    if let Err(err) = handle.join(profile).await {
        warn!("User {} could not join room {}: {}", user_id, room_id, err);
        return;
    }

    let (event_tx, mut event_rx) = mpsc::channel::<RoomEvent>(capacity);
    let (reply_tx, mut reply_rx) = mpsc::channel::<String>(REPLY_CAPACITY);

    if handle
        .subscribe(user_id, connection_id, event_tx)
        .await
        .is_err()
    {
        error!("Failed to subscribe to room {} broadcasts", room_id);
        return;
    }

    info!("WebSocket connected: room={}, user={}", room_id, user_id);
    let (mut sender, mut receiver) = socket.split();

    let send_task = tokio::spawn(async move {
        loop {
            let frame = tokio::select! {
                event = event_rx.recv() => match event {
                    Some(event) => ServerMessage::room_state(&event).to_json(),
                    None => {
                        // Room closed
                        let _ = sender.send(Message::Close(None)).await;
                        break;
                    }
                },
                reply = reply_rx.recv() => match reply {
                    Some(json) => Ok(json),
                    None => break,
                },
            };

            match frame {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!("Failed to serialize frame: {}", e),
            }
        }
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let message = match ClientMessage::parse(text.as_str()) {
                    Ok(message) => message,
                    Err(err) => {
                        warn!("Dropping frame from user {}: {}", user_id, err);
                        continue;
                    }
                };

                let result = match message.into_command(user_id) {
                    Ok(command) => {
                        debug!("User {} sent {}", user_id, command.name());
                        handle.submit(command).await
                    }
                    Err(err) => Err(err),
                };

                match result {
                    Ok(()) => {}
                    Err(RoomError::RoomClosed) => break,
                    Err(err) => {
                        warn!("Rejected command from user {}: {}", user_id, err);
                        if let Ok(json) = ServerMessage::rejected(&err).to_json()
                            && reply_tx.send(json).await.is_err()
                        {
                            break;
                        }
                    }
                }
            }
            Ok(Message::Close(_)) => break,
            Err(e) => {
                warn!("WebSocket error for user {}: {}", user_id, e);
                break;
            }
            _ => {}
        }
    }

    send_task.abort();
    let _ = handle.disconnect(user_id, connection_id).await;

    info!("WebSocket disconnected: room={}, user={}", room_id, user_id);
}
