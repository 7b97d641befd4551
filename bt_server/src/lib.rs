//! WebSocket and HTTP shell around the shared blackjack rooms.

pub mod api;
pub mod config;
pub mod logging;
