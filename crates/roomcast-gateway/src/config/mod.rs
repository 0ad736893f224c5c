//! Server config loader (strict parsing + env overrides).

pub mod schema;

use std::fs;

use roomcast_core::error::{ChatError, Result};

pub use schema::{RoomsSection, ServerConfig, ServerSection, StorageBackend, StorageSection};

/// Default config path, relative to the working directory.
pub const DEFAULT_PATH: &str = "roomcast.yaml";

pub fn load_from_file(path: &str) -> Result<ServerConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ChatError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServerConfig> {
    let cfg: ServerConfig = serde_yaml::from_str(s)
        .map_err(|e| ChatError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Apply deployment overrides (`PORT`, `DATABASE_URL`) on top of the file.
pub fn apply_env(cfg: &mut ServerConfig) -> Result<()> {
    apply_overrides(
        cfg,
        std::env::var("PORT").ok().as_deref(),
        std::env::var("DATABASE_URL").ok().as_deref(),
    )
}

pub fn apply_overrides(
    cfg: &mut ServerConfig,
    port: Option<&str>,
    database_url: Option<&str>,
) -> Result<()> {
    if let Some(port) = port {
        let port: u16 = port
            .parse()
            .map_err(|e| ChatError::BadRequest(format!("PORT must be a port number: {e}")))?;
        let host = cfg
            .server
            .listen
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        cfg.server.listen = format!("{host}:{port}");
    }
    if let Some(url) = database_url {
        cfg.storage.backend = StorageBackend::Sqlite;
        cfg.storage.url = url.to_string();
    }
    cfg.validate()
}
