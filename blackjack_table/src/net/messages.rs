use serde::{Deserialize, Serialize};

use crate::{
    game::entities::{BetAmount, Chips, Seat, UserId},
    room::{Cause, Command, RoomError, RoomEvent, RoomResult, RoomSnapshot},
};

/// An inbound frame, `{"event": ..., "data": {...}}`. Seat and amount
/// stay raw here so that out-of-range values are reported as invalid
/// actions rather than parse failures.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    PickSeat { user_id: UserId, seat: u8 },
    #[serde(rename_all = "camelCase")]
    PlaceBet { player_id: UserId, amount: Chips },
    #[serde(rename_all = "camelCase")]
    Hit { player_id: UserId },
    #[serde(rename_all = "camelCase")]
    Stand { player_id: UserId },
}

impl ClientMessage {
    /// Parse one text frame.
    pub fn parse(text: &str) -> RoomResult<Self> {
        serde_json::from_str(text).map_err(|err| RoomError::MalformedCommand(err.to_string()))
    }

    /// The id carried in the payload.
    pub fn issuer(&self) -> UserId {
        match *self {
            Self::PickSeat { user_id, .. } => user_id,
            Self::PlaceBet { player_id, .. }
            | Self::Hit { player_id }
            | Self::Stand { player_id } => player_id,
        }
    }

    /// Validate a frame received on `connection_user`'s connection.
    pub fn into_command(self, connection_user: UserId) -> RoomResult<Command> {
        if self.issuer() != connection_user {
            return Err(RoomError::IdentityMismatch);
        }
        Command::try_from(self)
    }
}

impl TryFrom<ClientMessage> for Command {
    type Error = RoomError;

    fn try_from(message: ClientMessage) -> Result<Self, Self::Error> {
        let command = match message {
            ClientMessage::PickSeat { user_id, seat } => Command::PickSeat {
                user_id,
                seat: Seat::try_from(seat).map_err(RoomError::InvalidSeat)?,
            },
            ClientMessage::PlaceBet { player_id, amount } => Command::PlaceBet {
                player_id,
                amount: BetAmount::try_from(amount).map_err(RoomError::InvalidBet)?,
            },
            ClientMessage::Hit { player_id } => Command::Hit { player_id },
            ClientMessage::Stand { player_id } => Command::Stand { player_id },
        };
        Ok(command)
    }
}

/// An outbound frame.
#[derive(Debug, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage<'a> {
    RoomState {
        state: &'a RoomSnapshot,
        #[serde(skip_serializing_if = "Option::is_none")]
        cause: Option<Cause>,
    },
    /// Sent to the originating connection only.
    Rejected { reason: String },
}

impl<'a> ServerMessage<'a> {
    pub fn room_state(event: &'a RoomEvent) -> Self {
        Self::RoomState {
            state: &event.state,
            cause: event.cause,
        }
    }

    pub fn rejected(err: &RoomError) -> Self {
        Self::Rejected {
            reason: err.client_message(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use uuid::Uuid;

    // === ClientMessage Tests ===

    #[test]
    fn test_parse_pick_seat() {
        let id = Uuid::new_v4();
        let text = json!({"event": "PICK_SEAT", "data": {"userId": id, "seat": 3}}).to_string();
        let message = ClientMessage::parse(&text).unwrap();
        assert_eq!(message, ClientMessage::PickSeat { user_id: id, seat: 3 });
        assert_eq!(
            message.into_command(id).unwrap(),
            Command::PickSeat {
                user_id: id,
                seat: Seat::try_from(3).unwrap()
            }
        );
    }

    #[test]
    fn test_parse_place_bet_hit_stand() {
        let id = Uuid::new_v4();
        let bet = json!({"event": "PLACE_BET", "data": {"playerId": id, "amount": 50}});
        assert_eq!(
            ClientMessage::parse(&bet.to_string()).unwrap(),
            ClientMessage::PlaceBet {
                player_id: id,
                amount: 50
            }
        );

        let hit = json!({"event": "HIT", "data": {"playerId": id}});
        assert_eq!(
            ClientMessage::parse(&hit.to_string()).unwrap(),
            ClientMessage::Hit { player_id: id }
        );

        let stand = json!({"event": "STAND", "data": {"playerId": id}});
        assert_eq!(
            ClientMessage::parse(&stand.to_string()).unwrap(),
            ClientMessage::Stand { player_id: id }
        );
    }

    #[test]
    fn test_malformed_frames() {
        for text in [
            "not json",
            r#"{"event": "DOUBLE_DOWN", "data": {}}"#,
            r#"{"event": "HIT", "data": {"playerId": "nope"}}"#,
            r#"{"event": "PLACE_BET", "data": {"playerId": "2b1f0c52-8a4e-4a51-9d0e-3e5d8b7a9c11"}}"#,
        ] {
            assert!(matches!(
                ClientMessage::parse(text),
                Err(RoomError::MalformedCommand(_))
            ));
        }
    }

    #[test]
    fn test_out_of_range_values_are_invalid_actions() {
        let id = Uuid::new_v4();
        let err = ClientMessage::PickSeat { user_id: id, seat: 7 }
            .into_command(id)
            .unwrap_err();
        assert!(matches!(err, RoomError::InvalidSeat(_)));
        assert!(err.is_invalid_action());

        let err = ClientMessage::PlaceBet {
            player_id: id,
            amount: 30,
        }
        .into_command(id)
        .unwrap_err();
        assert!(matches!(err, RoomError::InvalidBet(_)));
    }

    #[test]
    fn test_payload_id_must_match_connection() {
        let message = ClientMessage::Hit {
            player_id: Uuid::new_v4(),
        };
        assert_eq!(
            message.into_command(Uuid::new_v4()),
            Err(RoomError::IdentityMismatch)
        );
    }

    // === ServerMessage Tests ===

    #[test]
    fn test_rejected_frame() {
        let frame = ServerMessage::rejected(&RoomError::NotYourTurn)
            .to_json()
            .unwrap();
        let value: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value, json!({"event": "REJECTED", "data": {"reason": "Not your turn"}}));
    }

    #[test]
    fn test_room_state_frame_shape() {
        use crate::{
            accounts::InMemoryAccounts,
            game::entities::ShuffledDecks,
            room::{Room, RoomConfig},
        };

        let room = Room::new(
            "abcde".to_string(),
            RoomConfig::default(),
            Arc::new(InMemoryAccounts::default()),
            Box::new(ShuffledDecks::seeded(1)),
        );
        let event = RoomEvent {
            state: Arc::new(room.snapshot()),
            cause: Some(Cause::DealCard),
        };
        let value: Value =
            serde_json::from_str(&ServerMessage::room_state(&event).to_json().unwrap()).unwrap();

        assert_eq!(value["event"], "ROOM_STATE");
        assert_eq!(value["data"]["cause"], "DEAL_CARD");
        let state = &value["data"]["state"];
        assert_eq!(state["id"], "abcde");
        assert_eq!(state["status"], "IDLE");
        assert_eq!(state["seats"].as_array().unwrap().len(), 6);
        assert!(state["seats"][0].is_null());
        assert!(state["startsIn"].is_null());
        assert!(state["turnPlayer"].is_null());

        let quiet = RoomEvent {
            state: event.state.clone(),
            cause: None,
        };
        let value: Value =
            serde_json::from_str(&ServerMessage::room_state(&quiet).to_json().unwrap()).unwrap();
        assert!(value["data"].get("cause").is_none());
    }
}
