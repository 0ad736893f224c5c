use axum::extract::ws::Message;

use roomcast_core::protocol::ServerEvent;

/// Per-recipient wait applied to reliable deliveries.
pub const RELIABLE_TIMEOUT_MS: u64 = 1500;

/// Quality-of-Service strategy for outgoing delivery.
#[derive(Debug, Clone, Copy, Default)]
pub enum QoS {
    /// Best effort: do not await; if the session's queue is full, drop.
    #[default]
    Lossy,
    /// Wait for queue space, up to `timeout_ms` (0 waits indefinitely).
    Reliable { timeout_ms: u64 },
}

/// Application-level outgoing event.
#[derive(Debug, Clone)]
pub struct Outgoing {
    pub qos: QoS,
    pub event: ServerEvent,
}

impl Outgoing {
    pub fn reliable(event: ServerEvent) -> Self {
        Self {
            qos: QoS::Reliable { timeout_ms: RELIABLE_TIMEOUT_MS },
            event,
        }
    }

    pub fn lossy(event: ServerEvent) -> Self {
        Self { qos: QoS::Lossy, event }
    }
}

/// Prepared frame cached for broadcasting (serialize once, send N times).
#[derive(Debug, Clone)]
pub struct PreparedMsg(String);

impl PreparedMsg {
    pub fn prepare(out: &Outgoing) -> Self {
        PreparedMsg(out.event.to_json().to_string())
    }

    /// Convert to axum::ws::Message for transport.
    pub fn to_ws_message(&self) -> Message {
        Message::Text(self.0.clone())
    }
}
