//! Store contract tests, run against both backends.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use roomcast_core::ChatError;
use roomcast_gateway::config::{StorageBackend, StorageSection};
use roomcast_gateway::store::Stores;

async fn backends() -> Vec<(&'static str, Stores)> {
    let sqlite = Stores::open(&StorageSection {
        backend: StorageBackend::Sqlite,
        url: "sqlite::memory:".into(),
    })
    .await
    .expect("sqlite memory store");
    vec![("memory", Stores::memory()), ("sqlite", sqlite)]
}

#[tokio::test]
async fn register_twice_fails_once() {
    for (name, stores) in backends().await {
        stores.credentials.register("alice", "pw").await.unwrap();
        let err = stores.credentials.register("alice", "other").await.expect_err(name);
        assert!(matches!(err, ChatError::UsernameTaken), "{name}: {err:?}");
    }
}

#[tokio::test]
async fn verify_requires_exact_match() {
    for (name, stores) in backends().await {
        stores.credentials.register("bob", "secret").await.unwrap();
        assert_eq!(stores.credentials.verify("bob", "secret").await.unwrap(), "bob");
        let err = stores.credentials.verify("bob", "Secret").await.expect_err(name);
        assert!(matches!(err, ChatError::InvalidCredentials), "{name}");
        let err = stores.credentials.verify("nobody", "secret").await.expect_err(name);
        assert!(matches!(err, ChatError::InvalidCredentials), "{name}");

        stores.credentials.delete("bob").await.unwrap();
        assert!(stores.credentials.verify("bob", "secret").await.is_err(), "{name}");
        // deleting again is fine
        stores.credentials.delete("bob").await.unwrap();
    }
}

#[tokio::test]
async fn create_room_twice_fails_once() {
    for (name, stores) in backends().await {
        stores.rooms.create_room("lobby", 5).await.unwrap();
        let err = stores.rooms.create_room("lobby", 7).await.expect_err(name);
        assert!(matches!(err, ChatError::RoomExists), "{name}");

        let room = stores.rooms.find_room("lobby").await.unwrap().unwrap();
        assert_eq!(room.capacity, 5, "{name}");
        assert!(stores.rooms.find_room("nope").await.unwrap().is_none(), "{name}");
    }
}

#[tokio::test]
async fn recent_messages_are_last_n_oldest_first() {
    for (name, stores) in backends().await {
        stores.rooms.create_room("lobby", 10).await.unwrap();
        for i in 0..25 {
            stores
                .rooms
                .append_message("lobby", "alice", &format!("m{i}"))
                .await
                .unwrap();
        }
        stores.rooms.append_message("other", "bob", "elsewhere").await.unwrap();

        let recent = stores.rooms.recent_messages("lobby", 20).await.unwrap();
        let texts: Vec<&str> = recent.iter().map(|m| m.text.as_str()).collect();
        let expected: Vec<String> = (5..25).map(|i| format!("m{i}")).collect();
        assert_eq!(texts, expected, "{name}");
        assert!(
            recent.windows(2).all(|w| w[0].created_at <= w[1].created_at),
            "{name}: not ascending"
        );

        let few = stores.rooms.recent_messages("other", 20).await.unwrap();
        assert_eq!(few.len(), 1, "{name}");
    }
}

#[tokio::test]
async fn cascade_delete_removes_history_and_is_idempotent() {
    for (name, stores) in backends().await {
        stores.rooms.create_room("lobby", 10).await.unwrap();
        stores.rooms.append_message("lobby", "alice", "hi").await.unwrap();

        stores.rooms.delete_room_cascade("lobby").await.unwrap();
        assert!(stores.rooms.find_room("lobby").await.unwrap().is_none(), "{name}");
        assert!(stores.rooms.recent_messages("lobby", 20).await.unwrap().is_empty(), "{name}");

        stores.rooms.delete_room_cascade("lobby").await.unwrap();
    }
}
