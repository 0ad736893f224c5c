//! Persisted records and their client-facing projections.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

/// Author name used for server-generated lines ("alice joined.").
pub const SYSTEM_AUTHOR: &str = "System";

/// Room capacity applied when a create request carries no limit.
pub const DEFAULT_CAPACITY: u32 = 10;

/// Number of messages replayed to a joining session.
pub const HISTORY_LIMIT: usize = 20;

/// A named chat room. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub name: String,
    pub capacity: u32,
}

/// A persisted chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub author: String,
    pub text: String,
    pub room: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn to_line(&self) -> ChatLine {
        ChatLine {
            user: self.author.clone(),
            text: self.text.clone(),
            time: display_time(self.created_at),
        }
    }
}

/// One rendered chat line as clients see it, both live and in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatLine {
    pub user: String,
    pub text: String,
    pub time: String,
}

impl ChatLine {
    /// Server-authored line stamped with the current wall clock.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            user: SYSTEM_AUTHOR.to_string(),
            text: text.into(),
            time: display_time(Utc::now()),
        }
    }
}

/// Wall-clock display stamp, e.g. `03:07 PM`, in server local time.
pub fn display_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%I:%M %p").to_string()
}
