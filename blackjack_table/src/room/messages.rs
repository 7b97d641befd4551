//! Room actor message types.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::{errors::RoomResult, state::RoomStatus};
use crate::{
    accounts::{RoomId, UserProfile},
    game::entities::{BetAmount, DealerView, PlayerView, Seat, UserId},
};

/// Identifies one live connection. A user may hold several at once.
pub type ConnectionId = Uuid;

/// Messages that can be sent to a RoomActor
#[derive(Debug)]
pub enum RoomMessage {
    /// Enter the room as a spectator
    Join {
        profile: UserProfile,
        response: oneshot::Sender<RoomResult<()>>,
    },

    /// Validated player command
    Command {
        command: Command,
        response: oneshot::Sender<RoomResult<()>>,
    },

    /// Get current room state
    GetState {
        response: oneshot::Sender<RoomSnapshot>,
    },

    /// Subscribe a connection to room events; marks the user online
    Subscribe {
        user_id: UserId,
        connection_id: ConnectionId,
        sender: mpsc::Sender<RoomEvent>,
    },

    /// Connection dropped. The user goes offline once their last
    /// connection is gone and stays seated either way.
    Disconnect {
        user_id: UserId,
        connection_id: ConnectionId,
    },

    /// Refund open bets, release seats and stop the actor
    Close { response: oneshot::Sender<()> },
}

/// A command that passed boundary validation. Ids are the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    PickSeat { user_id: UserId, seat: Seat },
    PlaceBet { player_id: UserId, amount: BetAmount },
    Hit { player_id: UserId },
    Stand { player_id: UserId },
}

impl Command {
    /// User issuing the command
    pub fn issuer(&self) -> UserId {
        match *self {
            Command::PickSeat { user_id, .. } => user_id,
            Command::PlaceBet { player_id, .. }
            | Command::Hit { player_id }
            | Command::Stand { player_id } => player_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::PickSeat { .. } => "pick seat",
            Command::PlaceBet { .. } => "bet",
            Command::Hit { .. } => "hit",
            Command::Stand { .. } => "stand",
        }
    }
}

/// Why a snapshot was broadcast, when it is not a plain state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cause {
    DealCard,
    RevealHole,
    Payout,
    RoundAborted,
}

/// Broadcast to every subscriber of a room
#[derive(Debug, Clone)]
pub struct RoomEvent {
    pub state: Arc<RoomSnapshot>,
    pub cause: Option<Cause>,
}

/// Spectator entry in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpectatorView {
    pub id: UserId,
    pub name: String,
    pub avatar: String,
    pub online: bool,
}

/// Full public view of a room. Hidden cards are redacted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub status: RoomStatus,
    pub round: u64,
    pub dealer: DealerView,
    /// Always six entries, seat 1 first
    pub seats: Vec<Option<PlayerView>>,
    pub spectators: Vec<SpectatorView>,
    pub starts_in: Option<u32>,
    pub turn_ends_in: Option<u32>,
    pub turn_player: Option<UserId>,
}

impl RoomSnapshot {
    /// Player view for a user, if seated
    pub fn player(&self, user_id: Uuid) -> Option<&PlayerView> {
        self.seats.iter().flatten().find(|p| p.id == user_id)
    }

    pub fn seated_count(&self) -> usize {
        self.seats.iter().flatten().count()
    }
}
