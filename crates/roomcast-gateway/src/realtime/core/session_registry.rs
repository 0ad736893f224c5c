use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;

/// One session's outbound queue sender.
#[derive(Clone)]
pub struct Connection {
    pub tx: mpsc::Sender<Message>,
}

/// Session registry: `session_id -> Connection`.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, Connection>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn insert(&self, session_id: String, conn: Connection) {
        self.sessions.insert(session_id, conn);
    }

    pub fn remove(&self, session_id: &str) -> Option<Connection> {
        self.sessions.remove(session_id).map(|(_, conn)| conn)
    }

    pub fn get(&self, session_id: &str) -> Option<Connection> {
        self.sessions.get(session_id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
