//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness, with connected session count

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::app_state::AppState;

pub async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    let sessions = state.realtime().sessions.len();
    (StatusCode::OK, format!("ok sessions={sessions}"))
}
