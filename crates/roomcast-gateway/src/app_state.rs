//! Shared application state: config plus the wired hub.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::hub::ChatHub;
use crate::realtime::RealtimeCore;
use crate::store::Stores;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    realtime: Arc<RealtimeCore>,
    hub: Arc<ChatHub>,
}

struct AppStateInner {
    cfg: ServerConfig,
}

impl AppState {
    pub fn new(cfg: ServerConfig, stores: Stores) -> Self {
        let realtime = Arc::new(RealtimeCore::new());
        let hub = ChatHub::new(Arc::clone(&realtime), stores, cfg.rooms.clone());
        Self {
            inner: Arc::new(AppStateInner { cfg }),
            realtime,
            hub,
        }
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn realtime(&self) -> Arc<RealtimeCore> {
        Arc::clone(&self.realtime)
    }

    pub fn hub(&self) -> Arc<ChatHub> {
        Arc::clone(&self.hub)
    }
}
