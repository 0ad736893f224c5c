use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use roomcast_core::error::{ChatError, Result};
use roomcast_core::model::{DEFAULT_CAPACITY, HISTORY_LIMIT};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub rooms: RoomsSection,

    #[serde(default)]
    pub storage: StorageSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            rooms: RoomsSection::default(),
            storage: StorageSection::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ChatError::BadRequest(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.rooms.validate()?;
        self.storage.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            static_dir: default_static_dir(),
            outbound_queue: default_outbound_queue(),
            ping_interval_ms: default_ping_interval_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(1..=65536).contains(&self.outbound_queue) {
            return Err(ChatError::BadRequest(
                "server.outbound_queue must be between 1 and 65536".into(),
            ));
        }
        if !(5000..=120000).contains(&self.ping_interval_ms) {
            return Err(ChatError::BadRequest(
                "server.ping_interval_ms must be between 5000 and 120000".into(),
            ));
        }
        if self.idle_timeout_ms <= self.ping_interval_ms {
            return Err(ChatError::BadRequest(
                "server.idle_timeout_ms must be greater than ping_interval_ms".into(),
            ));
        }
        if self.max_frame_bytes < 64 {
            return Err(ChatError::BadRequest(
                "server.max_frame_bytes must be at least 64".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            ChatError::BadRequest(format!("server.listen must be a valid SocketAddr: {e}"))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:3000".into()
}
fn default_static_dir() -> String {
    "public".into()
}
fn default_outbound_queue() -> usize {
    256
}
fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_idle_timeout_ms() -> u64 {
    60000
}
fn default_max_frame_bytes() -> usize {
    16 * 1024
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomsSection {
    #[serde(default = "default_capacity")]
    pub default_capacity: u32,

    /// How long an empty room survives before it is reclaimed.
    #[serde(default = "default_empty_grace_secs")]
    pub empty_grace_secs: u64,

    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Reject `join room` from sessions that never registered or logged in.
    #[serde(default)]
    pub require_login: bool,
}

impl Default for RoomsSection {
    fn default() -> Self {
        Self {
            default_capacity: default_capacity(),
            empty_grace_secs: default_empty_grace_secs(),
            history_limit: default_history_limit(),
            require_login: false,
        }
    }
}

impl RoomsSection {
    pub fn validate(&self) -> Result<()> {
        if self.default_capacity == 0 {
            return Err(ChatError::BadRequest(
                "rooms.default_capacity must be positive".into(),
            ));
        }
        if self.empty_grace_secs == 0 {
            return Err(ChatError::BadRequest(
                "rooms.empty_grace_secs must be positive".into(),
            ));
        }
        if !(1..=500).contains(&self.history_limit) {
            return Err(ChatError::BadRequest(
                "rooms.history_limit must be between 1 and 500".into(),
            ));
        }
        Ok(())
    }

    pub fn empty_grace(&self) -> Duration {
        Duration::from_secs(self.empty_grace_secs)
    }
}

fn default_capacity() -> u32 {
    DEFAULT_CAPACITY
}
fn default_empty_grace_secs() -> u64 {
    300
}
fn default_history_limit() -> usize {
    HISTORY_LIMIT
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSection {
    #[serde(default)]
    pub backend: StorageBackend,

    #[serde(default = "default_storage_url")]
    pub url: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            url: default_storage_url(),
        }
    }
}

impl StorageSection {
    pub fn validate(&self) -> Result<()> {
        if self.backend == StorageBackend::Sqlite && self.url.trim().is_empty() {
            return Err(ChatError::BadRequest(
                "storage.url is required for the sqlite backend".into(),
            ));
        }
        Ok(())
    }
}

fn default_storage_url() -> String {
    "sqlite://roomcast.db?mode=rwc".into()
}
