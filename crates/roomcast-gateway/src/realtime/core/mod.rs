//! Realtime core components for the gateway runtime.
//!
//! Session registry, presence tracking, reclamation timers, and the egress
//! runtime shared by the hub.

mod presence;
mod realtime;
mod reclaimer;
mod session;
mod session_registry;

pub use presence::Presence;
pub use realtime::{RealtimeCore, RoomBook};
pub use reclaimer::Reclaimer;
pub use session::{Session, SessionState};
pub use session_registry::{Connection, SessionRegistry};
