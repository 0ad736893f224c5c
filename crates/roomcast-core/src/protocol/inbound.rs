//! Typed client requests.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::value::RawValue;

use crate::error::{ChatError, Result};
use crate::protocol::envelope::Envelope;
use crate::protocol::events;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub pass: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomReq {
    pub room_name: String,
    /// Absent means the configured default capacity.
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JoinRoomReq {
    pub username: String,
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReq {
    #[serde(default)]
    pub user: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TypingReq {
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRoomReq {
    pub room_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeleteAccountReq {
    pub username: String,
}

/// One decoded client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Register(Credentials),
    Login(Credentials),
    CreateRoom(CreateRoomReq),
    JoinRoom(JoinRoomReq),
    ChatMessage(ChatReq),
    Typing(TypingReq),
    StopTyping(TypingReq),
    DeleteRoom(DeleteRoomReq),
    DeleteAccount(DeleteAccountReq),
}

impl ClientEvent {
    /// Select the payload shape by event name, then parse `data` once.
    pub fn from_envelope(env: &Envelope) -> Result<Self> {
        let raw = env.data.as_deref();
        let event = env.event.as_str();
        let ev = match event {
            events::REGISTER => ClientEvent::Register(parse_data(event, raw)?),
            events::LOGIN => ClientEvent::Login(parse_data(event, raw)?),
            events::CREATE_ROOM => ClientEvent::CreateRoom(parse_data(event, raw)?),
            events::JOIN_ROOM => ClientEvent::JoinRoom(parse_data(event, raw)?),
            events::CHAT_MESSAGE => ClientEvent::ChatMessage(parse_data(event, raw)?),
            events::TYPING => ClientEvent::Typing(parse_data(event, raw)?),
            events::STOP_TYPING => ClientEvent::StopTyping(parse_data(event, raw)?),
            events::DELETE_ROOM => ClientEvent::DeleteRoom(parse_data(event, raw)?),
            events::DELETE_ACCOUNT => ClientEvent::DeleteAccount(parse_data(event, raw)?),
            other => return Err(ChatError::BadRequest(format!("unknown event: {other}"))),
        };
        Ok(ev)
    }

    /// Wire name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::Register(_) => events::REGISTER,
            ClientEvent::Login(_) => events::LOGIN,
            ClientEvent::CreateRoom(_) => events::CREATE_ROOM,
            ClientEvent::JoinRoom(_) => events::JOIN_ROOM,
            ClientEvent::ChatMessage(_) => events::CHAT_MESSAGE,
            ClientEvent::Typing(_) => events::TYPING,
            ClientEvent::StopTyping(_) => events::STOP_TYPING,
            ClientEvent::DeleteRoom(_) => events::DELETE_ROOM,
            ClientEvent::DeleteAccount(_) => events::DELETE_ACCOUNT,
        }
    }
}

/// With lazy parsing, payload errors are reported per event, never panicked on.
fn parse_data<T: DeserializeOwned>(event: &str, raw: Option<&RawValue>) -> Result<T> {
    let s = raw.map(RawValue::get).unwrap_or("{}");
    serde_json::from_str(s)
        .map_err(|e| ChatError::BadRequest(format!("invalid `{event}` payload: {e}")))
}
