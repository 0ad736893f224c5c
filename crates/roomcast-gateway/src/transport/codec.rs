//! Decode-once codec for the transport layer.
//!
//! - Text frames => `ClientEvent` (envelope first, payload parsed lazily by event)
//! - Binary frames are not part of the chat protocol and are refused
//! - Ping/Pong/Close are surfaced for lifecycle management

use axum::extract::ws::Message;
use roomcast_core::{
    error::{ChatError, Result},
    protocol::{ClientEvent, Envelope},
};

#[derive(Debug)]
pub enum Inbound {
    Event(ClientEvent),
    Ping(Vec<u8>),
    Pong,
    Close,
}

/// Cheap frame length, checked before any parsing.
pub fn frame_len(msg: &Message) -> usize {
    match msg {
        Message::Text(s) => s.len(),
        Message::Binary(b) => b.len(),
        Message::Ping(v) | Message::Pong(v) => v.len(),
        Message::Close(_) => 0,
    }
}

pub fn decode(msg: Message) -> Result<Inbound> {
    match msg {
        Message::Text(s) => {
            let env = Envelope::parse(&s)?;
            Ok(Inbound::Event(ClientEvent::from_envelope(&env)?))
        }
        Message::Binary(_) => Err(ChatError::BadRequest(
            "binary frames are not supported".into(),
        )),
        Message::Ping(v) => Ok(Inbound::Ping(v)),
        Message::Pong(_) => Ok(Inbound::Pong),
        Message::Close(_) => Ok(Inbound::Close),
    }
}
