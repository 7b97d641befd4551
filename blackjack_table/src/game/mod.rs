//! Blackjack card model.
//!
//! This module provides the leaves of the table engine:
//! - Cards, the deck, and deck sources
//! - Dealer and player hand accounting
//! - Pure counting and settlement rules

pub mod constants;
pub mod entities;
pub mod functional;

pub use entities::{
    BetAmount, Card, CardValue, Chips, Dealer, DealerStatus, Deck, DeckError, DeckSource, Player,
    PlayerStatus, Rank, Seat, ShuffledDecks, StackedDecks, Suit, UserId,
};
