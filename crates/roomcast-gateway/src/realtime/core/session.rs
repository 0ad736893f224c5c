/// Where a session sits in `Connected -> Authenticated -> Joined(room)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Authenticated,
    Joined(String),
}

/// Server-side state of one client connection.
///
/// Owned by the connection task; the hub mutates it while handling that
/// connection's events.
#[derive(Debug)]
pub struct Session {
    id: String,
    username: Option<String>,
    current_room: Option<String>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: None,
            current_room: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn current_room(&self) -> Option<&str> {
        self.current_room.as_deref()
    }

    pub fn state(&self) -> SessionState {
        match (&self.current_room, &self.username) {
            (Some(room), _) => SessionState::Joined(room.clone()),
            (None, Some(_)) => SessionState::Authenticated,
            (None, None) => SessionState::Connected,
        }
    }

    pub(crate) fn set_username(&mut self, username: impl Into<String>) {
        self.username = Some(username.into());
    }

    pub(crate) fn set_room(&mut self, room: Option<String>) {
        self.current_room = room;
    }
}
