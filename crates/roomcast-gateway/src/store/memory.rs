use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use roomcast_core::error::{ChatError, Result};
use roomcast_core::model::{Message, Room};

use super::{CredentialStore, RoomRepository};

/// In-memory accounts, rooms and per-room history (insertion ordered).
#[derive(Default)]
pub struct MemoryStore {
    accounts: DashMap<String, String>,
    rooms: DashMap<String, Room>,
    messages: DashMap<String, Vec<Message>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn register(&self, username: &str, secret: &str) -> Result<()> {
        match self.accounts.entry(username.to_string()) {
            Entry::Occupied(_) => Err(ChatError::UsernameTaken),
            Entry::Vacant(slot) => {
                slot.insert(secret.to_string());
                Ok(())
            }
        }
    }

    async fn verify(&self, username: &str, secret: &str) -> Result<String> {
        match self.accounts.get(username) {
            Some(stored) if stored.value() == secret => Ok(username.to_string()),
            _ => Err(ChatError::InvalidCredentials),
        }
    }

    async fn delete(&self, username: &str) -> Result<()> {
        self.accounts.remove(username);
        Ok(())
    }
}

#[async_trait]
impl RoomRepository for MemoryStore {
    async fn create_room(&self, name: &str, capacity: u32) -> Result<()> {
        match self.rooms.entry(name.to_string()) {
            Entry::Occupied(_) => Err(ChatError::RoomExists),
            Entry::Vacant(slot) => {
                slot.insert(Room {
                    name: name.to_string(),
                    capacity,
                });
                Ok(())
            }
        }
    }

    async fn find_room(&self, name: &str) -> Result<Option<Room>> {
        Ok(self.rooms.get(name).map(|r| r.value().clone()))
    }

    async fn delete_room_cascade(&self, name: &str) -> Result<()> {
        self.messages.remove(name);
        self.rooms.remove(name);
        Ok(())
    }

    async fn append_message(&self, room: &str, author: &str, text: &str) -> Result<DateTime<Utc>> {
        let mut history = self.messages.entry(room.to_string()).or_default();
        // never stamp earlier than the previous line, even if the wall clock steps back
        let created_at = match history.last() {
            Some(last) if last.created_at > Utc::now() => last.created_at,
            _ => Utc::now(),
        };
        history.push(Message {
            author: author.to_string(),
            text: text.to_string(),
            room: room.to_string(),
            created_at,
        });
        Ok(created_at)
    }

    async fn recent_messages(&self, room: &str, limit: usize) -> Result<Vec<Message>> {
        let Some(history) = self.messages.get(room) else {
            return Ok(Vec::new());
        };
        let start = history.len().saturating_sub(limit);
        Ok(history[start..].to_vec())
    }
}
