//! Room module providing shared blackjack rooms with an async actor model.
//!
//! This module implements:
//! - Room: the round state machine with six seats and spectators
//! - RoomActor: async actor owning a single room and its timers
//! - RoomManager: registry spawning and discovering rooms
//! - Message-based communication with tokio channels
//!
//! ## Architecture
//!
//! Each room runs in a separate Tokio task with an mpsc message inbox.
//! The room itself never sleeps; it arms one generation-tagged wakeup at a
//! time and the actor fires it when due. Snapshots are broadcast to
//! subscribers with `try_send`, so a slow connection never stalls a room.
//!
//! ## Example
//!
//! ```
//! use blackjack_table::{
//!     accounts::InMemoryAccounts,
//!     game::entities::Seat,
//!     room::{Command, RoomConfig, RoomManager, RoomStatus},
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let accounts = Arc::new(InMemoryAccounts::default());
//!     let manager = RoomManager::new(accounts.clone(), RoomConfig::default());
//!
//!     let room_id = manager.create_room().await.unwrap();
//!     let user = accounts.create_user("alice", "fox").await;
//!     manager.join_room(&room_id, user.profile()).await.unwrap();
//!
//!     let seat = Seat::try_from(1).unwrap();
//!     let command = Command::PickSeat { user_id: user.id, seat };
//!     manager.dispatch(&room_id, command).await.unwrap();
//!
//!     let state = manager.get_room_state(&room_id).await.unwrap();
//!     assert_eq!(state.status, RoomStatus::Starting);
//! }
//! ```

pub mod actor;
pub mod config;
pub mod errors;
pub mod manager;
pub mod messages;
pub mod state;

pub use actor::{RoomActor, RoomHandle};
pub use config::RoomConfig;
pub use errors::{RoomError, RoomResult};
pub use manager::{RoomManager, RoomMetadata, generate_room_id};
pub use messages::{
    Cause, Command, ConnectionId, RoomEvent, RoomMessage, RoomSnapshot, SpectatorView,
};
pub use state::{Room, RoomStatus, Wakeup, WakeupKind};
