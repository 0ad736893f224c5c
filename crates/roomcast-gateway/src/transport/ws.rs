//! WebSocket handler.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS
//! - Writer task draining the session's outbound queue
//! - Reader loop: size check, decode once, hand the event to the hub and wait
//!   for it to finish before reading the next frame
//! - Lifecycle: ping + idle timeout, disconnect exactly once

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, State},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tracing::Instrument;

use roomcast_core::error::ChatError;

use crate::app_state::AppState;
use crate::transport::codec::{decode, frame_len, Inbound};

pub async fn ws_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_session(app, socket))
}

async fn run_session(app: AppState, socket: WebSocket) {
    let server = &app.cfg().server;
    let (out_tx, mut out_rx) = mpsc::channel::<Message>(server.outbound_queue);
    let (mut ws_tx, mut ws_rx) = socket.split();

    let hub = app.hub();
    let mut session = hub.connect(out_tx.clone());
    let span = tracing::info_span!("session", sid = %session.id());

    let max_frame_bytes = server.max_frame_bytes;
    let idle_timeout = Duration::from_millis(server.idle_timeout_ms);
    let mut ping_tick = tokio::time::interval(Duration::from_millis(server.ping_interval_ms));
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    async move {
        tracing::info!("connected");

        // outbound writer
        let mut writer = tokio::spawn(async move {
            while let Some(m) = out_rx.recv().await {
                if ws_tx.send(m).await.is_err() {
                    break;
                }
            }
        });

        let mut last_activity = Instant::now();

        loop {
            tokio::select! {
                incoming = ws_rx.next() => {
                    let Some(Ok(msg)) = incoming else { break; };
                    last_activity = Instant::now();

                    let bytes_len = frame_len(&msg);
                    if bytes_len > max_frame_bytes {
                        tracing::warn!(bytes_len, "oversized frame rejected");
                        hub.reject(&session, &ChatError::BadRequest("Message too large!".into())).await;
                        continue;
                    }

                    match decode(msg) {
                        Ok(Inbound::Event(event)) => hub.handle(&mut session, event).await,
                        Ok(Inbound::Ping(payload)) => {
                            let _ = out_tx.send(Message::Pong(payload)).await;
                        }
                        Ok(Inbound::Pong) => {}
                        Ok(Inbound::Close) => break,
                        Err(e) => {
                            tracing::warn!(error = %e, "undecodable frame");
                            hub.reject(&session, &e).await;
                        }
                    }
                }

                _ = ping_tick.tick() => {
                    if last_activity.elapsed() >= idle_timeout {
                        tracing::info!("idle timeout");
                        break;
                    }
                    let _ = out_tx.send(Message::Ping(Vec::new())).await;
                }

                _ = &mut writer => break,
            }
        }

        hub.disconnect(session).await;
        writer.abort();
        tracing::info!("closed");
    }
    .instrument(span)
    .await
}
