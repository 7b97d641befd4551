//! Wire protocol shared by the server and its clients.
//!
//! Frames are JSON text of the form `{"event": ..., "data": {...}}`.

/// Inbound and outbound frame types.
pub mod messages;

pub use messages::{ClientMessage, ServerMessage};
