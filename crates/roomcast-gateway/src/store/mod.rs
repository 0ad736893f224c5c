//! Persistence contracts for accounts, rooms and message history.
//!
//! The hub only ever talks to these traits. Two backends ship:
//! - `memory`: `DashMap`-backed, process lifetime only (dev, tests).
//! - `sqlite`: `sqlx` pool, schema created on connect.

mod memory;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use roomcast_core::error::Result;
use roomcast_core::model::{Message, Room};

use crate::config::{StorageBackend, StorageSection};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Account records. Secrets are compared verbatim.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fails with `UsernameTaken` if the name exists.
    async fn register(&self, username: &str, secret: &str) -> Result<()>;
    /// Returns the identity on an exact match, `InvalidCredentials` otherwise.
    async fn verify(&self, username: &str, secret: &str) -> Result<String>;
    /// Removing an unknown account is not an error.
    async fn delete(&self, username: &str) -> Result<()>;
}

/// Room definitions and their message history.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Fails with `RoomExists` if the name exists.
    async fn create_room(&self, name: &str, capacity: u32) -> Result<()>;
    async fn find_room(&self, name: &str) -> Result<Option<Room>>;
    /// Drops the room and all of its messages. Idempotent.
    async fn delete_room_cascade(&self, name: &str) -> Result<()>;
    /// Persists one message and returns its server-assigned timestamp.
    async fn append_message(&self, room: &str, author: &str, text: &str) -> Result<DateTime<Utc>>;
    /// The most recent `limit` messages of `room`, oldest first.
    async fn recent_messages(&self, room: &str, limit: usize) -> Result<Vec<Message>>;
}

/// Both store handles, as the hub consumes them.
#[derive(Clone)]
pub struct Stores {
    pub credentials: Arc<dyn CredentialStore>,
    pub rooms: Arc<dyn RoomRepository>,
}

impl Stores {
    /// One in-memory store serving both roles.
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            credentials: store.clone(),
            rooms: store,
        }
    }

    /// Open the backend selected by config.
    pub async fn open(cfg: &StorageSection) -> Result<Self> {
        match cfg.backend {
            StorageBackend::Memory => Ok(Self::memory()),
            StorageBackend::Sqlite => {
                let store = Arc::new(SqliteStore::connect(&cfg.url).await?);
                Ok(Self {
                    credentials: store.clone(),
                    rooms: store,
                })
            }
        }
    }
}
