//! Hub behaviour when the room repository fails or stalls: the requester gets
//! the generic error, everyone else carries on, and no membership or timer
//! state is left half-changed.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::ws::Message as WsMessage;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::Instant;

use roomcast_core::error::{ChatError, Result};
use roomcast_core::model::{Message, Room};
use roomcast_core::protocol::inbound::{ChatReq, CreateRoomReq, DeleteRoomReq, JoinRoomReq};
use roomcast_core::protocol::ClientEvent;
use roomcast_gateway::config::RoomsSection;
use roomcast_gateway::hub::ChatHub;
use roomcast_gateway::realtime::{RealtimeCore, Session, SessionState};
use roomcast_gateway::store::{MemoryStore, RoomRepository, Stores};

const GENERIC: &str = "Something went wrong.";

#[derive(Default)]
struct Faults {
    create: AtomicBool,
    delete: AtomicBool,
    append: AtomicBool,
    history: AtomicBool,
    delete_delay_secs: AtomicU64,
}

/// In-memory rooms with switchable failures.
#[derive(Default)]
struct FlakyRooms {
    inner: MemoryStore,
    faults: Faults,
}

fn check(flag: &AtomicBool) -> Result<()> {
    if flag.load(Ordering::SeqCst) {
        return Err(ChatError::Repository("store unavailable".into()));
    }
    Ok(())
}

#[async_trait]
impl RoomRepository for FlakyRooms {
    async fn create_room(&self, name: &str, capacity: u32) -> Result<()> {
        check(&self.faults.create)?;
        self.inner.create_room(name, capacity).await
    }

    async fn find_room(&self, name: &str) -> Result<Option<Room>> {
        self.inner.find_room(name).await
    }

    async fn delete_room_cascade(&self, name: &str) -> Result<()> {
        let delay = self.faults.delete_delay_secs.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_secs(delay)).await;
        }
        check(&self.faults.delete)?;
        self.inner.delete_room_cascade(name).await
    }

    async fn append_message(&self, room: &str, author: &str, text: &str) -> Result<DateTime<Utc>> {
        check(&self.faults.append)?;
        self.inner.append_message(room, author, text).await
    }

    async fn recent_messages(&self, room: &str, limit: usize) -> Result<Vec<Message>> {
        check(&self.faults.history)?;
        self.inner.recent_messages(room, limit).await
    }
}

struct Client {
    session: Session,
    rx: mpsc::Receiver<WsMessage>,
}

impl Client {
    fn drain(&mut self) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            if let WsMessage::Text(s) = msg {
                frames.push(serde_json::from_str(&s).unwrap());
            }
        }
        frames
    }
}

fn setup() -> (Arc<ChatHub>, Arc<FlakyRooms>) {
    let rooms = Arc::new(FlakyRooms::default());
    let stores = Stores {
        credentials: Arc::new(MemoryStore::new()),
        rooms: rooms.clone(),
    };
    let hub = ChatHub::new(Arc::new(RealtimeCore::new()), stores, RoomsSection::default());
    (hub, rooms)
}

fn connect(hub: &ChatHub) -> Client {
    let (tx, rx) = mpsc::channel(64);
    Client {
        session: hub.connect(tx),
        rx,
    }
}

fn set(flag: &AtomicBool, on: bool) {
    flag.store(on, Ordering::SeqCst);
}

fn create(name: &str) -> ClientEvent {
    ClientEvent::CreateRoom(CreateRoomReq {
        room_name: name.into(),
        limit: None,
    })
}

fn join(username: &str, room: &str) -> ClientEvent {
    ClientEvent::JoinRoom(JoinRoomReq {
        username: username.into(),
        room: room.into(),
    })
}

fn say(text: &str) -> ClientEvent {
    ClientEvent::ChatMessage(ChatReq {
        user: String::new(),
        text: text.into(),
    })
}

fn delete(room: &str) -> ClientEvent {
    ClientEvent::DeleteRoom(DeleteRoomReq {
        room_name: room.into(),
    })
}

async fn send(hub: &Arc<ChatHub>, client: &mut Client, event: ClientEvent) {
    hub.handle(&mut client.session, event).await;
}

fn assert_generic_error(frames: &[Value]) {
    assert_eq!(frames.len(), 1, "{frames:?}");
    assert_eq!(frames[0]["event"], "error message");
    assert_eq!(frames[0]["data"], GENERIC);
}

#[tokio::test]
async fn failed_create_reports_and_recovers() {
    let (hub, rooms) = setup();
    let mut c = connect(&hub);

    set(&rooms.faults.create, true);
    send(&hub, &mut c, create("lobby")).await;
    assert_generic_error(&c.drain());
    assert!(rooms.inner.find_room("lobby").await.unwrap().is_none());

    set(&rooms.faults.create, false);
    send(&hub, &mut c, create("lobby")).await;
    assert_eq!(c.drain()[0]["event"], "room-created");
}

#[tokio::test]
async fn failed_history_fetch_leaves_joiner_outside() {
    let (hub, rooms) = setup();
    let mut bob = connect(&hub);
    let mut alice = connect(&hub);
    send(&hub, &mut bob, create("lobby")).await;
    send(&hub, &mut bob, join("bob", "lobby")).await;
    bob.drain();

    set(&rooms.faults.history, true);
    send(&hub, &mut alice, join("alice", "lobby")).await;
    assert_generic_error(&alice.drain());
    assert!(bob.drain().is_empty());
    assert_eq!(alice.session.state(), SessionState::Connected);
    {
        let book = hub.core().rooms().await;
        assert_eq!(book.presence.room_of(alice.session.id()), None);
        assert_eq!(book.presence.sessions_in("lobby").len(), 1);
    }

    // not a member, so nothing reaches the room
    send(&hub, &mut alice, say("boo")).await;
    assert!(bob.drain().is_empty());
    set(&rooms.faults.history, false);
    assert!(rooms.inner.recent_messages("lobby", 20).await.unwrap().is_empty());

    send(&hub, &mut alice, join("alice", "lobby")).await;
    assert_eq!(alice.drain()[0]["event"], "room joined");
    assert_eq!(bob.drain()[0]["data"]["text"], "alice joined.");
}

#[tokio::test]
async fn failed_history_fetch_keeps_previous_room() {
    let (hub, rooms) = setup();
    let mut alice = connect(&hub);
    send(&hub, &mut alice, create("a")).await;
    send(&hub, &mut alice, create("b")).await;
    send(&hub, &mut alice, join("alice", "a")).await;
    alice.drain();

    set(&rooms.faults.history, true);
    send(&hub, &mut alice, join("alice", "b")).await;
    assert_generic_error(&alice.drain());
    assert_eq!(alice.session.current_room(), Some("a"));

    let book = hub.core().rooms().await;
    assert_eq!(book.presence.room_of(alice.session.id()), Some("a"));
    assert!(!book.reclaimer.is_pending("a"));
}

#[tokio::test]
async fn failed_append_is_not_broadcast() {
    let (hub, rooms) = setup();
    let mut bob = connect(&hub);
    let mut alice = connect(&hub);
    send(&hub, &mut bob, create("lobby")).await;
    send(&hub, &mut bob, join("bob", "lobby")).await;
    send(&hub, &mut alice, join("alice", "lobby")).await;
    bob.drain();
    alice.drain();

    set(&rooms.faults.append, true);
    send(&hub, &mut alice, say("lost")).await;
    assert_generic_error(&alice.drain());
    assert!(bob.drain().is_empty());
    assert_eq!(hub.core().rooms().await.presence.sessions_in("lobby").len(), 2);

    set(&rooms.faults.append, false);
    send(&hub, &mut bob, say("back")).await;
    assert_eq!(alice.drain()[0]["data"]["text"], "back");
}

#[tokio::test(start_paused = true)]
async fn failed_delete_room_keeps_members_and_timers() {
    let (hub, rooms) = setup();
    let mut alice = connect(&hub);
    let mut carol = connect(&hub);
    let mut admin = connect(&hub);
    send(&hub, &mut alice, create("lobby")).await;
    send(&hub, &mut alice, create("quiet")).await;
    send(&hub, &mut alice, join("alice", "lobby")).await;
    send(&hub, &mut carol, join("carol", "quiet")).await;
    hub.disconnect(carol.session).await;
    alice.drain();

    set(&rooms.faults.delete, true);
    send(&hub, &mut admin, delete("lobby")).await;
    assert_generic_error(&admin.drain());
    send(&hub, &mut admin, delete("quiet")).await;
    assert_generic_error(&admin.drain());

    assert!(alice.drain().is_empty());
    assert!(rooms.inner.find_room("lobby").await.unwrap().is_some());
    let book = hub.core().rooms().await;
    assert_eq!(book.presence.room_of(alice.session.id()), Some("lobby"));
    assert!(book.reclaimer.is_pending("quiet"));
}

#[tokio::test(start_paused = true)]
async fn failed_reclaim_is_retried_until_the_store_recovers() {
    let (hub, rooms) = setup();
    let mut alice = connect(&hub);
    send(&hub, &mut alice, create("lobby")).await;
    send(&hub, &mut alice, join("alice", "lobby")).await;
    send(&hub, &mut alice, say("hi")).await;
    hub.disconnect(alice.session).await;

    set(&rooms.faults.delete, true);
    tokio::time::sleep(Duration::from_secs(301)).await;
    assert!(rooms.inner.find_room("lobby").await.unwrap().is_some());
    {
        let book = hub.core().rooms().await;
        assert!(book.presence.is_empty("lobby"));
        assert!(book.reclaimer.is_pending("lobby"), "timer re-armed after failure");
        assert!(!book.reclaimer.is_reclaiming("lobby"));
    }

    set(&rooms.faults.delete, false);
    tokio::time::sleep(Duration::from_secs(300)).await;
    assert!(rooms.inner.find_room("lobby").await.unwrap().is_none());
    assert!(rooms.inner.recent_messages("lobby", 20).await.unwrap().is_empty());
    assert_eq!(hub.core().rooms().await.reclaimer.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn slow_reclaim_does_not_stall_other_rooms() {
    let (hub, rooms) = setup();
    let mut alice = connect(&hub);
    let mut bob = connect(&hub);
    let mut carol = connect(&hub);
    send(&hub, &mut alice, create("a")).await;
    send(&hub, &mut alice, create("b")).await;
    send(&hub, &mut alice, join("alice", "a")).await;
    send(&hub, &mut bob, join("bob", "b")).await;
    hub.disconnect(alice.session).await;
    bob.drain();

    rooms.faults.delete_delay_secs.store(60, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(310)).await;
    assert!(hub.core().rooms().await.reclaimer.is_reclaiming("a"));

    let started = Instant::now();
    send(&hub, &mut bob, say("still here")).await;
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(bob.drain()[0]["data"]["text"], "still here");

    // a room being reclaimed cannot be joined
    send(&hub, &mut carol, join("carol", "a")).await;
    let frames = carol.drain();
    assert_eq!(frames[0]["data"], "Room not found!");
    assert_eq!(hub.core().rooms().await.presence.room_of(carol.session.id()), None);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(rooms.inner.find_room("a").await.unwrap().is_none());
    assert!(!hub.core().rooms().await.reclaimer.is_reclaiming("a"));
}
