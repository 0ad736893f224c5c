//! Chat hub: routes a session's events to the stores, presence and reclaimer,
//! then fans results out to the room.
//!
//! Session lifecycle: `Connected -> Authenticated -> Joined(room)`.
//! Every handler either completes or surfaces a `ChatError` as an
//! `error message` event to the requesting session only; nothing here ends the
//! connection or the process.

use std::sync::Arc;

use axum::extract::ws::Message;
use chrono::Utc;
use tokio::sync::mpsc;
use uuid::Uuid;

use roomcast_core::error::{ChatError, ClientCode, Result};
use roomcast_core::model::{display_time, ChatLine};
use roomcast_core::protocol::inbound::{
    ChatReq, CreateRoomReq, Credentials, DeleteAccountReq, DeleteRoomReq, JoinRoomReq, TypingReq,
};
use roomcast_core::protocol::{ClientEvent, ServerEvent};

use crate::config::RoomsSection;
use crate::realtime::core::Connection;
use crate::realtime::{Outgoing, RealtimeCore, RoomBook, Session};
use crate::store::Stores;

pub struct ChatHub {
    core: Arc<RealtimeCore>,
    stores: Stores,
    rooms_cfg: RoomsSection,
}

impl ChatHub {
    pub fn new(core: Arc<RealtimeCore>, stores: Stores, rooms_cfg: RoomsSection) -> Arc<Self> {
        Arc::new(Self {
            core,
            stores,
            rooms_cfg,
        })
    }

    pub fn core(&self) -> &RealtimeCore {
        &self.core
    }

    /// Register a new connection's outbound queue and hand back its session.
    pub fn connect(&self, tx: mpsc::Sender<Message>) -> Session {
        let session = Session::new(Uuid::new_v4().to_string());
        self.core
            .sessions
            .insert(session.id().to_string(), Connection { tx });
        tracing::debug!(sid = %session.id(), "session connected");
        session
    }

    /// Handle one inbound event to completion.
    pub async fn handle(self: &Arc<Self>, session: &mut Session, event: ClientEvent) {
        let name = event.name();
        if let Err(e) = self.route(session, event).await {
            match e.client_code() {
                code @ (ClientCode::Validation | ClientCode::BadRequest) => {
                    tracing::debug!(event = name, code = code.as_str(), error = %e, "request rejected");
                }
                code @ (ClientCode::Repository | ClientCode::Internal) => {
                    tracing::warn!(event = name, code = code.as_str(), error = %e, "request failed");
                }
            }
            self.reject(session, &e).await;
        }
    }

    /// Report an error to the requesting session only.
    pub async fn reject(&self, session: &Session, err: &ChatError) {
        self.reply(session, ServerEvent::ErrorMessage(err.user_message()))
            .await;
    }

    /// Connection closed: leave the room, tell the others, maybe arm reclamation.
    pub async fn disconnect(self: &Arc<Self>, session: Session) {
        self.core.sessions.remove(session.id());

        let left = {
            let mut book = self.core.rooms().await;
            let room = book.presence.room_of(session.id()).map(str::to_string);
            if let Some(room) = &room {
                self.leave_locked(&mut book, room, session.id());
            }
            room
        };

        if let Some(room) = left {
            let who = session.username().unwrap_or("Someone");
            self.core
                .publish_room(
                    &room,
                    Outgoing::reliable(ServerEvent::ChatMessage(ChatLine::system(format!(
                        "{who} left."
                    )))),
                    None,
                )
                .await;
        }
        tracing::debug!(sid = %session.id(), "session disconnected");
    }

    async fn route(self: &Arc<Self>, session: &mut Session, event: ClientEvent) -> Result<()> {
        match event {
            ClientEvent::Register(req) => self.register(session, req).await,
            ClientEvent::Login(req) => self.login(session, req).await,
            ClientEvent::CreateRoom(req) => self.create_room(session, req).await,
            ClientEvent::JoinRoom(req) => self.join_room(session, req).await,
            ClientEvent::ChatMessage(req) => self.chat_message(session, req).await,
            ClientEvent::Typing(req) => self.typing(session, req, true).await,
            ClientEvent::StopTyping(req) => self.typing(session, req, false).await,
            ClientEvent::DeleteRoom(req) => self.delete_room(session, req).await,
            ClientEvent::DeleteAccount(req) => self.delete_account(session, req).await,
        }
    }

    async fn register(&self, session: &mut Session, req: Credentials) -> Result<()> {
        if req.user.trim().is_empty() {
            return Err(ChatError::BadRequest("Username required!".into()));
        }
        self.stores
            .credentials
            .register(&req.user, &req.pass)
            .await?;
        tracing::info!(user = %req.user, "account registered");
        session.set_username(req.user.clone());
        self.reply(session, ServerEvent::AuthSuccess(req.user)).await;
        Ok(())
    }

    async fn login(&self, session: &mut Session, req: Credentials) -> Result<()> {
        let identity = self
            .stores
            .credentials
            .verify(&req.user, &req.pass)
            .await?;
        session.set_username(identity.clone());
        self.reply(session, ServerEvent::AuthSuccess(identity)).await;
        Ok(())
    }

    async fn create_room(&self, session: &Session, req: CreateRoomReq) -> Result<()> {
        let name = room_key(&req.room_name);
        if name.is_empty() {
            return Err(ChatError::BadRequest("Room name required!".into()));
        }
        let capacity = match req.limit {
            None => self.rooms_cfg.default_capacity,
            Some(limit) => u32::try_from(limit)
                .ok()
                .filter(|c| *c > 0)
                .ok_or_else(|| ChatError::BadRequest("Room limit must be positive!".into()))?,
        };

        self.stores.rooms.create_room(name, capacity).await?;
        tracing::info!(room = %name, capacity, "room created");
        self.reply(
            session,
            ServerEvent::RoomCreated {
                room_name: name.to_string(),
                time: display_time(Utc::now()),
            },
        )
        .await;
        Ok(())
    }

    async fn join_room(self: &Arc<Self>, session: &mut Session, req: JoinRoomReq) -> Result<()> {
        if self.rooms_cfg.require_login && session.username().is_none() {
            return Err(ChatError::BadRequest("Log in first!".into()));
        }
        let username = match req.username.trim() {
            "" => session
                .username()
                .map(str::to_string)
                .ok_or_else(|| ChatError::BadRequest("Username required!".into()))?,
            name => name.to_string(),
        };

        let room = self
            .stores
            .rooms
            .find_room(room_key(&req.room))
            .await?
            .ok_or(ChatError::RoomNotFound)?;
        let room = room.name;
        // fetched before any membership change so a failure leaves nothing half-joined
        let history = self
            .stores
            .rooms
            .recent_messages(&room, self.rooms_cfg.history_limit)
            .await?;

        // switching rooms replaces the old membership
        let previous = {
            let mut book = self.core.rooms().await;
            if book.reclaimer.is_reclaiming(&room) {
                return Err(ChatError::RoomNotFound);
            }
            book.reclaimer.cancel(&room);
            let previous = book
                .presence
                .room_of(session.id())
                .filter(|old| *old != room)
                .map(str::to_string);
            if let Some(old) = &previous {
                self.leave_locked(&mut book, old, session.id());
            }
            book.presence.join(&room, session.id());
            previous
        };

        session.set_username(username.clone());
        session.set_room(Some(room.clone()));
        tracing::debug!(%room, user = %username, "joined room");

        if let Some(old) = previous {
            self.core
                .publish_room(
                    &old,
                    Outgoing::reliable(ServerEvent::ChatMessage(ChatLine::system(format!(
                        "{username} left."
                    )))),
                    None,
                )
                .await;
        }

        self.reply(session, ServerEvent::RoomJoined(room.clone())).await;
        self.reply(
            session,
            ServerEvent::LoadHistory(history.iter().map(|m| m.to_line()).collect()),
        )
        .await;

        self.core
            .publish_room(
                &room,
                Outgoing::reliable(ServerEvent::ChatMessage(ChatLine::system(format!(
                    "{username} joined."
                )))),
                Some(session.id()),
            )
            .await;
        Ok(())
    }

    async fn chat_message(&self, session: &mut Session, req: ChatReq) -> Result<()> {
        let Some(room) = self.joined_room(session).await else {
            tracing::debug!(sid = %session.id(), "chat message outside a room ignored");
            return Ok(());
        };
        let author = session
            .username()
            .map(str::to_string)
            .unwrap_or(req.user);

        let created_at = self
            .stores
            .rooms
            .append_message(&room, &author, &req.text)
            .await?;

        self.core
            .publish_room(
                &room,
                Outgoing::reliable(ServerEvent::ChatMessage(ChatLine {
                    user: author,
                    text: req.text,
                    time: display_time(created_at),
                })),
                None,
            )
            .await;
        Ok(())
    }

    /// Typing indicators are lossy and never stored.
    async fn typing(&self, session: &mut Session, req: TypingReq, started: bool) -> Result<()> {
        let Some(room) = self.joined_room(session).await else {
            return Ok(());
        };
        let user = session
            .username()
            .map(str::to_string)
            .unwrap_or(req.user);
        let event = if started {
            ServerEvent::Typing { user }
        } else {
            ServerEvent::StopTyping { user }
        };
        self.core
            .publish_room(&room, Outgoing::lossy(event), Some(session.id()))
            .await;
        Ok(())
    }

    async fn delete_room(&self, session: &mut Session, req: DeleteRoomReq) -> Result<()> {
        let room = room_key(&req.room_name).to_string();
        self.stores.rooms.delete_room_cascade(&room).await?;

        let members = {
            let mut book = self.core.rooms().await;
            book.reclaimer.cancel(&room);
            book.presence.evict_room(&room)
        };
        if session.current_room() == Some(room.as_str()) {
            session.set_room(None);
        }
        tracing::info!(%room, kicked = members.len(), "room deleted");

        self.core
            .publish_to(members, Outgoing::reliable(ServerEvent::RoomKicked))
            .await;
        Ok(())
    }

    async fn delete_account(&self, session: &Session, req: DeleteAccountReq) -> Result<()> {
        self.stores
            .credentials
            .delete(&req.username)
            .await
            .map_err(|e| match e {
                ChatError::DeleteFailed(_) => e,
                other => ChatError::DeleteFailed(other.to_string()),
            })?;
        tracing::info!(user = %req.username, "account deleted");
        self.reply(session, ServerEvent::AccountDeleted).await;
        Ok(())
    }

    /// Room the session is joined to, reconciled with presence: a room deleted
    /// out from under the session no longer counts.
    async fn joined_room(&self, session: &mut Session) -> Option<String> {
        let current = self
            .core
            .rooms()
            .await
            .presence
            .room_of(session.id())
            .map(str::to_string);
        if current.as_deref() != session.current_room() {
            session.set_room(current.clone());
        }
        current
    }

    /// Remove a member while holding the book; arm reclamation if the room emptied.
    fn leave_locked(self: &Arc<Self>, book: &mut RoomBook, room: &str, session_id: &str) {
        if book.presence.leave(room, session_id) {
            self.arm_reclaim(book, room);
        }
    }

    fn arm_reclaim(self: &Arc<Self>, book: &mut RoomBook, room: &str) {
        let hub = Arc::clone(self);
        let name = room.to_string();
        book.reclaimer
            .schedule(room, self.rooms_cfg.empty_grace(), move |ticket| async move {
                hub.reclaim(&name, ticket).await;
            });
    }

    /// Timer body: delete the room unless it was rejoined or the timer replaced.
    ///
    /// The book is not held across the repository call; the room is marked as
    /// reclaiming instead so joins arriving meanwhile are turned away.
    async fn reclaim(self: &Arc<Self>, room: &str, ticket: u64) {
        {
            let mut book = self.core.rooms().await;
            if !book.reclaimer.claim(room, ticket) {
                return;
            }
            if !book.presence.is_empty(room) {
                tracing::debug!(%room, "reclamation skipped, room occupied");
                return;
            }
            book.reclaimer.begin_reclaim(room);
        }

        let deleted = self.stores.rooms.delete_room_cascade(room).await;

        let members = {
            let mut book = self.core.rooms().await;
            book.reclaimer.finish_reclaim(room);
            match &deleted {
                Ok(()) => book.presence.evict_room(room),
                Err(_) => {
                    // still empty and unclaimed: try again after another grace period
                    if book.presence.is_empty(room) && !book.reclaimer.is_pending(room) {
                        self.arm_reclaim(&mut book, room);
                    }
                    Vec::new()
                }
            }
        };

        match deleted {
            Ok(()) => tracing::info!(%room, "empty room reclaimed"),
            Err(e) => tracing::warn!(%room, error = %e, "room reclamation failed, re-armed"),
        }
        self.core
            .publish_to(members, Outgoing::reliable(ServerEvent::RoomKicked))
            .await;
    }

    async fn reply(&self, session: &Session, event: ServerEvent) {
        if let Err(e) = self
            .core
            .send_to_session(session.id(), Outgoing::reliable(event))
            .await
        {
            tracing::debug!(sid = %session.id(), error = %e, "reply dropped");
        }
    }
}

/// Room names are compared with surrounding whitespace removed.
fn room_key(raw: &str) -> &str {
    raw.trim()
}
