use std::collections::{HashMap, HashSet};

/// Room presence: room -> sessions, session -> room.
///
/// Plain maps; callers serialize access through `RoomBook`'s lock so that a
/// membership change and the matching reclaimer update happen together.
#[derive(Debug, Default)]
pub struct Presence {
    room_to_sessions: HashMap<String, HashSet<String>>,
    session_to_room: HashMap<String, String>,
}

impl Presence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `session` in `room`. A session is tracked in one room at a time;
    /// callers leave the previous room first.
    pub fn join(&mut self, room: &str, session: &str) {
        self.room_to_sessions
            .entry(room.to_string())
            .or_default()
            .insert(session.to_string());
        self.session_to_room
            .insert(session.to_string(), room.to_string());
    }

    /// Remove `session` from `room`. Returns true when the room is now empty,
    /// including when it had no tracked members at all.
    pub fn leave(&mut self, room: &str, session: &str) -> bool {
        if self.session_to_room.get(session).map(String::as_str) == Some(room) {
            self.session_to_room.remove(session);
        }
        let Some(set) = self.room_to_sessions.get_mut(room) else {
            return true;
        };
        set.remove(session);
        if set.is_empty() {
            self.room_to_sessions.remove(room);
            return true;
        }
        false
    }

    pub fn is_empty(&self, room: &str) -> bool {
        self.room_to_sessions
            .get(room)
            .map_or(true, HashSet::is_empty)
    }

    pub fn sessions_in(&self, room: &str) -> Vec<String> {
        self.room_to_sessions
            .get(room)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn room_of(&self, session: &str) -> Option<&str> {
        self.session_to_room.get(session).map(String::as_str)
    }

    /// Drop every member of `room` and return who they were.
    pub fn evict_room(&mut self, room: &str) -> Vec<String> {
        let members: Vec<String> = self
            .room_to_sessions
            .remove(room)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default();
        for session in &members {
            self.session_to_room.remove(session);
        }
        members
    }

    pub fn room_count(&self) -> usize {
        self.room_to_sessions.len()
    }
}
