use std::sync::Arc;

use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::{timeout, Duration};

use roomcast_core::error::{ChatError, Result};

use crate::realtime::core::{Presence, Reclaimer, SessionRegistry};
use crate::realtime::types::{Outgoing, PreparedMsg, QoS};

/// Presence and reclamation timers, always locked together.
#[derive(Default)]
pub struct RoomBook {
    pub presence: Presence,
    pub reclaimer: Reclaimer,
}

/// RealtimeCore: egress engine (send to session / publish to room) plus the
/// shared room book.
#[derive(Default)]
pub struct RealtimeCore {
    pub sessions: Arc<SessionRegistry>,
    rooms: Mutex<RoomBook>,
}

impl RealtimeCore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(SessionRegistry::new()),
            rooms: Mutex::new(RoomBook::default()),
        }
    }

    /// Lock presence + reclaimer. Keep the guard short; never hold it while
    /// publishing.
    pub async fn rooms(&self) -> MutexGuard<'_, RoomBook> {
        self.rooms.lock().await
    }

    pub async fn send_to_session(&self, session_id: &str, out: Outgoing) -> Result<()> {
        let conn = self
            .sessions
            .get(session_id)
            .ok_or_else(|| ChatError::Internal(format!("session {session_id} not connected")))?;
        let msg = PreparedMsg::prepare(&out).to_ws_message();
        match out.qos {
            QoS::Lossy => {
                let _ = conn.tx.try_send(msg);
            }
            QoS::Reliable { timeout_ms } => {
                let sent = if timeout_ms > 0 {
                    timeout(Duration::from_millis(timeout_ms), conn.tx.send(msg))
                        .await
                        .map_err(|_| ChatError::Internal("outbound queue timeout".into()))?
                } else {
                    conn.tx.send(msg).await
                };
                sent.map_err(|_| ChatError::Internal("outbound channel closed".into()))?;
            }
        }
        Ok(())
    }

    /// Publish to the sessions joined to `room` right now, optionally skipping one.
    pub async fn publish_room(&self, room: &str, out: Outgoing, except: Option<&str>) {
        let targets: Vec<String> = self
            .rooms()
            .await
            .presence
            .sessions_in(room)
            .into_iter()
            .filter(|sid| Some(sid.as_str()) != except)
            .collect();
        self.publish_to(targets, out).await;
    }

    /// Publish to an explicit session list.
    pub async fn publish_to(&self, targets: Vec<String>, out: Outgoing) {
        let prepared = PreparedMsg::prepare(&out);
        match out.qos {
            QoS::Lossy => {
                for sid in targets {
                    if let Some(conn) = self.sessions.get(&sid) {
                        let _ = conn.tx.try_send(prepared.to_ws_message());
                    }
                }
            }
            QoS::Reliable { timeout_ms } => {
                let mut futs = FuturesUnordered::new();
                for sid in targets {
                    if let Some(conn) = self.sessions.get(&sid) {
                        let msg = prepared.to_ws_message();
                        futs.push(async move {
                            if timeout_ms > 0 {
                                let _ = timeout(Duration::from_millis(timeout_ms), conn.tx.send(msg)).await;
                            } else {
                                let _ = conn.tx.send(msg).await;
                            }
                        });
                    }
                }
                while futs.next().await.is_some() {}
            }
        }
    }
}
