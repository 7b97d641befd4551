//! Account module owning user records and balances.
//!
//! This module implements:
//! - User provisioning with a starting balance
//! - The `AccountService` interface rooms use for every balance change
//! - An in-memory ledger of bets, payouts and refunds
//! - The one-seat-per-user rule across all rooms
//!
//! ## Example
//!
//! ```
//! use blackjack_table::accounts::{AccountService, EntryType, InMemoryAccounts};
//!
//! #[tokio::main]
//! async fn main() {
//!     let accounts = InMemoryAccounts::new(500);
//!     let user = accounts.create_user("alice", "fox").await;
//!
//!     let balance = accounts
//!         .debit(user.id, "abcde", 100, EntryType::Bet)
//!         .await
//!         .unwrap();
//!     assert_eq!(balance, 400);
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{AccountError, AccountResult};
pub use manager::{AccountService, InMemoryAccounts};
pub use models::{EntryDirection, EntryType, LedgerEntry, RoomId, User, UserProfile};
