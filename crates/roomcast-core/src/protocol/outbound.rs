//! Typed server notifications and their JSON frames.

use serde_json::{json, Value};

use crate::model::ChatLine;
use crate::protocol::envelope::PROTOCOL_VERSION;
use crate::protocol::events;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    AuthSuccess(String),
    ErrorMessage(String),
    RoomCreated { room_name: String, time: String },
    RoomJoined(String),
    /// Oldest first.
    LoadHistory(Vec<ChatLine>),
    ChatMessage(ChatLine),
    Typing { user: String },
    StopTyping { user: String },
    RoomKicked,
    AccountDeleted,
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::AuthSuccess(_) => events::AUTH_SUCCESS,
            ServerEvent::ErrorMessage(_) => events::ERROR_MESSAGE,
            ServerEvent::RoomCreated { .. } => events::ROOM_CREATED,
            ServerEvent::RoomJoined(_) => events::ROOM_JOINED,
            ServerEvent::LoadHistory(_) => events::LOAD_HISTORY,
            ServerEvent::ChatMessage(_) => events::CHAT_MESSAGE,
            ServerEvent::Typing { .. } => events::TYPING,
            ServerEvent::StopTyping { .. } => events::STOP_TYPING,
            ServerEvent::RoomKicked => events::ROOM_KICKED,
            ServerEvent::AccountDeleted => events::ACCOUNT_DELETED,
        }
    }

    fn data(&self) -> Value {
        match self {
            ServerEvent::AuthSuccess(user) => json!(user),
            ServerEvent::ErrorMessage(msg) => json!(msg),
            ServerEvent::RoomCreated { room_name, time } => {
                json!({ "roomName": room_name, "time": time })
            }
            ServerEvent::RoomJoined(room) => json!(room),
            ServerEvent::LoadHistory(lines) => json!(lines),
            ServerEvent::ChatMessage(line) => json!(line),
            ServerEvent::Typing { user } | ServerEvent::StopTyping { user } => {
                json!({ "user": user })
            }
            ServerEvent::RoomKicked | ServerEvent::AccountDeleted => Value::Null,
        }
    }

    /// Full outbound frame: `{"v":1,"event":...,"data":...}`.
    pub fn to_json(&self) -> Value {
        json!({
            "v": PROTOCOL_VERSION,
            "event": self.name(),
            "data": self.data(),
        })
    }
}
