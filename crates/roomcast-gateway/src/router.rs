//! Axum router wiring.
//!
//! `/ws` upgrades to the chat socket, `/healthz` answers liveness probes, and
//! everything else is served from the static directory (`/` -> `index.html`).

use axum::{routing::get, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.cfg().server.static_dir);
    Router::new()
        .route("/ws", get(transport::ws::ws_upgrade))
        .route("/healthz", get(ops::healthz))
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
