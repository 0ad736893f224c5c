//! Event envelope (JSON text frame).
//!
//! The envelope stores `data` as `RawValue` so the payload is only parsed once
//! the event name has selected its shape.

use serde::Deserialize;
use serde_json::value::RawValue;

use crate::error::{ChatError, Result};

/// Only wire version understood by this build.
pub const PROTOCOL_VERSION: u8 = 1;

/// Inbound envelope (Text frame).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    /// Protocol version.
    pub v: u8,
    /// Event name (e.g. "join room").
    pub event: String,
    /// Optional payload, stored as raw JSON (lazy parsing).
    #[serde(default)]
    pub data: Option<Box<RawValue>>,
}

impl Envelope {
    /// Decode a text frame into an envelope.
    pub fn parse(s: &str) -> Result<Self> {
        let env: Envelope = serde_json::from_str(s)
            .map_err(|e| ChatError::BadRequest(format!("invalid envelope json: {e}")))?;
        if env.v != PROTOCOL_VERSION {
            return Err(ChatError::BadRequest(format!(
                "unsupported protocol version: {}",
                env.v
            )));
        }
        Ok(env)
    }
}
