use super::entities::Chips;

/// Number of seats at a room.
pub const MAX_SEATS: usize = 6;

/// Number of cards in a fresh deck.
pub const DECK_SIZE: usize = 52;

/// Best possible hand count.
pub const BLACKJACK: u8 = 21;

/// The dealer keeps drawing while their count is at or below this.
pub const DEALER_HITS_ON_OR_BELOW: u8 = 16;

/// Chip denominations a player may bet with.
pub const BET_DENOMINATIONS: [Chips; 4] = [25, 50, 100, 500];

/// Balance granted to a freshly provisioned user.
pub const DEFAULT_BALANCE: Chips = 500;

/// Length of generated room identifiers.
pub const ROOM_ID_LENGTH: usize = 5;
