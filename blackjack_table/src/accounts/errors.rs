//! Account error types.

use thiserror::Error;

use super::models::RoomId;
use crate::game::entities::{Chips, UserId};

/// Account errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    /// User not found
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// Insufficient balance
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: Chips, required: Chips },

    /// Invalid amount (must be positive)
    #[error("Invalid amount: {0}")]
    InvalidAmount(Chips),

    /// User already holds a seat in another room
    #[error("Already seated in room {0}")]
    AlreadySeated(RoomId),
}

impl AccountError {
    /// Get a client-safe error message that doesn't leak other users' ids
    pub fn client_message(&self) -> String {
        match self {
            AccountError::UserNotFound(_) => "User not found".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for account operations
pub type AccountResult<T> = Result<T, AccountError>;
