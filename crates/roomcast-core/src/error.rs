//! Shared error type across roomcast crates.

use thiserror::Error;

/// Client-facing error classes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Name already taken, room missing, wrong credentials.
    Validation,
    /// Malformed frame or payload.
    BadRequest,
    /// Persistence layer failed.
    Repository,
    /// Anything else on the server side.
    Internal,
}

impl ClientCode {
    /// Stable tag attached to request-failure log events.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::Validation => "VALIDATION",
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::Repository => "REPOSITORY",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ChatError>;

/// Unified error type used by core, stores and gateway.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("username taken")]
    UsernameTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("room exists")]
    RoomExists,
    #[error("room not found")]
    RoomNotFound,
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("repository: {0}")]
    Repository(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ChatError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            ChatError::UsernameTaken
            | ChatError::InvalidCredentials
            | ChatError::RoomExists
            | ChatError::RoomNotFound => ClientCode::Validation,
            ChatError::BadRequest(_) => ClientCode::BadRequest,
            ChatError::DeleteFailed(_) | ChatError::Repository(_) => ClientCode::Repository,
            ChatError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Text carried by the `error message` event.
    ///
    /// Validation failures use fixed strings clients already match on; storage
    /// and internal failures are collapsed into one generic line so driver
    /// details never reach a browser.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::UsernameTaken => "Username taken!".into(),
            ChatError::InvalidCredentials => "Invalid credentials!".into(),
            ChatError::RoomExists => "Room exists!".into(),
            ChatError::RoomNotFound => "Room not found!".into(),
            ChatError::DeleteFailed(_) => "Delete failed.".into(),
            ChatError::BadRequest(msg) => msg.clone(),
            ChatError::Repository(_) | ChatError::Internal(_) => "Something went wrong.".into(),
        }
    }
}
