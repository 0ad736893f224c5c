use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use roomcast_core::error::{ChatError, Result};
use roomcast_core::model::{Message, Room};

use super::{CredentialStore, RoomRepository};

const SCHEMA: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS accounts (username TEXT PRIMARY KEY NOT NULL, secret TEXT NOT NULL)",
    "CREATE TABLE IF NOT EXISTS rooms (name TEXT PRIMARY KEY NOT NULL, capacity INTEGER NOT NULL DEFAULT 10)",
    "CREATE TABLE IF NOT EXISTS messages (id INTEGER PRIMARY KEY AUTOINCREMENT, author TEXT NOT NULL, body TEXT NOT NULL, room TEXT NOT NULL, created_at TEXT NOT NULL)",
    "CREATE INDEX IF NOT EXISTS messages_room_created ON messages (room, created_at)",
];

/// SQLite-backed accounts, rooms and history.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect and create the schema if it is missing.
    ///
    /// In-memory databases are per-connection, so those get a single
    /// connection that is never recycled.
    pub async fn connect(url: &str) -> Result<Self> {
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(8)
        };
        let pool = options.connect(url).await.map_err(repo_err)?;

        for stmt in SCHEMA {
            sqlx::query(stmt).execute(&pool).await.map_err(repo_err)?;
        }
        tracing::info!(%url, "sqlite store ready");

        Ok(Self { pool })
    }
}

fn repo_err(e: sqlx::Error) -> ChatError {
    ChatError::Repository(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn register(&self, username: &str, secret: &str) -> Result<()> {
        sqlx::query("INSERT INTO accounts (username, secret) VALUES (?, ?)")
            .bind(username)
            .bind(secret)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ChatError::UsernameTaken
                } else {
                    repo_err(e)
                }
            })?;
        Ok(())
    }

    async fn verify(&self, username: &str, secret: &str) -> Result<String> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT username FROM accounts WHERE username = ? AND secret = ?")
                .bind(username)
                .bind(secret)
                .fetch_optional(&self.pool)
                .await
                .map_err(repo_err)?;
        row.map(|(name,)| name).ok_or(ChatError::InvalidCredentials)
    }

    async fn delete(&self, username: &str) -> Result<()> {
        sqlx::query("DELETE FROM accounts WHERE username = ?")
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| ChatError::DeleteFailed(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl RoomRepository for SqliteStore {
    async fn create_room(&self, name: &str, capacity: u32) -> Result<()> {
        sqlx::query("INSERT INTO rooms (name, capacity) VALUES (?, ?)")
            .bind(name)
            .bind(i64::from(capacity))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ChatError::RoomExists
                } else {
                    repo_err(e)
                }
            })?;
        Ok(())
    }

    async fn find_room(&self, name: &str) -> Result<Option<Room>> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT name, capacity FROM rooms WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(repo_err)?;
        let Some((name, capacity)) = row else {
            return Ok(None);
        };
        let capacity = u32::try_from(capacity)
            .map_err(|_| ChatError::Internal(format!("room {name} has capacity {capacity}")))?;
        Ok(Some(Room { name, capacity }))
    }

    async fn delete_room_cascade(&self, name: &str) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(repo_err)?;
        sqlx::query("DELETE FROM messages WHERE room = ?")
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(repo_err)?;
        sqlx::query("DELETE FROM rooms WHERE name = ?")
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(repo_err)?;
        tx.commit().await.map_err(repo_err)?;
        Ok(())
    }

    async fn append_message(&self, room: &str, author: &str, text: &str) -> Result<DateTime<Utc>> {
        let created_at = Utc::now();
        sqlx::query("INSERT INTO messages (author, body, room, created_at) VALUES (?, ?, ?, ?)")
            .bind(author)
            .bind(text)
            .bind(room)
            .bind(created_at)
            .execute(&self.pool)
            .await
            .map_err(repo_err)?;
        Ok(created_at)
    }

    async fn recent_messages(&self, room: &str, limit: usize) -> Result<Vec<Message>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<(String, String, String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT author, body, room, created_at FROM messages \
             WHERE room = ? ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(room)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(repo_err)?;

        // fetched newest first
        Ok(rows
            .into_iter()
            .rev()
            .map(|(author, text, room, created_at)| Message {
                author,
                text,
                room,
                created_at,
            })
            .collect())
    }
}
