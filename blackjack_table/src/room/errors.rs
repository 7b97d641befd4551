//! Room error types.

use thiserror::Error;

use super::state::RoomStatus;
use crate::{
    accounts::{AccountError, RoomId},
    game::entities::Seat,
};

/// Room errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// Inbound payload could not be parsed
    #[error("Malformed command: {0}")]
    MalformedCommand(String),

    /// Seat number outside 1..=6
    #[error("Invalid seat: {0}")]
    InvalidSeat(String),

    /// Bet outside the chip denominations
    #[error("Invalid bet: {0}")]
    InvalidBet(String),

    #[error("Seat {0} is taken")]
    SeatTaken(Seat),

    /// User has not joined this room
    #[error("Not in room")]
    NotInRoom,

    /// Payload id does not belong to the connection
    #[error("Payload id does not match the connected user")]
    IdentityMismatch,

    #[error("Not your turn")]
    NotYourTurn,

    #[error("Cannot {action} while the room is {status}")]
    WrongPhase {
        action: &'static str,
        status: RoomStatus,
    },

    /// Account service refused the operation
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Deck ran out mid-round; the round was aborted and bets refunded
    #[error("Deck exhausted, round aborted")]
    DeckExhausted,

    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    /// Room actor is gone
    #[error("Room is closed")]
    RoomClosed,
}

impl RoomError {
    /// Whether this rejects a well-formed command the room refused
    pub fn is_invalid_action(&self) -> bool {
        !matches!(
            self,
            RoomError::MalformedCommand(_)
                | RoomError::DeckExhausted
                | RoomError::RoomNotFound(_)
                | RoomError::RoomClosed
        )
    }

    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            RoomError::Account(err) => err.client_message(),
            _ => self.to_string(),
        }
    }
}

/// Result type for room operations
pub type RoomResult<T> = Result<T, RoomError>;
