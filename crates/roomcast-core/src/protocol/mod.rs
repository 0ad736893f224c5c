//! Protocol modules (envelope + typed events).
//!
//! Every frame on the wire is a JSON envelope naming an event:
//! - Inbound: client requests (`register`, `join room`, `chat message`, ...).
//! - Outbound: server notifications (`auth-success`, `load history`, ...).
//!
//! Parsing is panic-free: malformed input is reported as `ChatError::BadRequest`
//! and the connection keeps running.

pub mod envelope;
pub mod inbound;
pub mod outbound;

pub use envelope::{Envelope, PROTOCOL_VERSION};
pub use inbound::ClientEvent;
pub use outbound::ServerEvent;

/// Event names shared by both directions.
pub mod events {
    pub const REGISTER: &str = "register";
    pub const LOGIN: &str = "login";
    pub const CREATE_ROOM: &str = "create room";
    pub const JOIN_ROOM: &str = "join room";
    pub const CHAT_MESSAGE: &str = "chat message";
    pub const TYPING: &str = "typing";
    pub const STOP_TYPING: &str = "stop typing";
    pub const DELETE_ROOM: &str = "delete room";
    pub const DELETE_ACCOUNT: &str = "delete account";

    pub const AUTH_SUCCESS: &str = "auth-success";
    pub const ERROR_MESSAGE: &str = "error message";
    pub const ROOM_CREATED: &str = "room-created";
    pub const ROOM_JOINED: &str = "room joined";
    pub const LOAD_HISTORY: &str = "load history";
    pub const ROOM_KICKED: &str = "room kicked";
    pub const ACCOUNT_DELETED: &str = "account deleted";
}
