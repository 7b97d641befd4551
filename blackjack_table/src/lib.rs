//! # Blackjack Table
//!
//! A shared multi-seat blackjack room engine.
//!
//! Each room seats up to six players in front of a single dealer, lets any
//! number of spectators watch, and runs rounds continuously for as long as
//! anyone is seated:
//!
//! - **IDLE**: No one seated
//! - **STARTING**: Ten second countdown to the next round
//! - **BETTING**: Players bet one at a time in seat order
//! - **DEALING_CARDS**: Two cards each, dealt round-robin, dealer last
//! - **PLAYING**: Players hit or stand one at a time in seat order
//! - **END**: Dealer reveals, draws to 17 and pays out
//!
//! ## Core Modules
//!
//! - [`game`]: Cards, decks, hands and settlement rules
//! - [`accounts`]: Users and balances behind the `AccountService` interface
//! - [`room`]: The room state machine, its actor and the room registry
//! - [`net`]: JSON wire frames
//!
//! ## Example
//!
//! ```
//! use blackjack_table::game::{entities::{Card, Rank, Suit}, functional::hand_count};
//!
//! let hand = [Card::new(Rank::Ace, Suit::Spades), Card::new(Rank::King, Suit::Hearts)];
//! assert_eq!(hand_count(&hand), 21);
//! ```

/// Users, balances and the ledger.
pub mod accounts;

/// Card model and pure blackjack rules.
pub mod game;
pub use game::{constants, entities, functional};

/// JSON wire protocol.
pub mod net;

/// Rooms, their actors and the registry.
pub mod room;
pub use room::{Room, RoomConfig, RoomError, RoomManager, RoomStatus};
