//! Realtime runtime for the chat gateway.
//!
//! Session registry, presence, empty-room reclamation and QoS-based publish
//! helpers.

pub mod core;
pub mod types;

pub use core::{Presence, RealtimeCore, Reclaimer, RoomBook, Session, SessionRegistry, SessionState};
pub use types::{Outgoing, PreparedMsg, QoS};
