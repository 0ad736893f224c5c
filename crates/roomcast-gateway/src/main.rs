//! roomcast server
//!
//! - WebSocket endpoint: /ws
//! - Static client from `server.static_dir`
//! - Tracing span per session
//! - Graceful shutdown on Ctrl+C / SIGTERM

use std::path::Path;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roomcast_gateway::{app_state, config, router, store::Stores};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = std::env::var("ROOMCAST_CONFIG").unwrap_or_else(|_| config::DEFAULT_PATH.to_string());
    let mut cfg = if Path::new(&path).exists() {
        config::load_from_file(&path).expect("config load failed")
    } else {
        tracing::warn!(%path, "config file not found, using defaults");
        config::ServerConfig::default()
    };
    config::apply_env(&mut cfg).expect("invalid PORT/DATABASE_URL override");

    let listen = cfg.server.listen_addr().expect("server.listen must be a valid SocketAddr");
    let stores = Stores::open(&cfg.storage).await.expect("storage init failed");

    let state = app_state::AppState::new(cfg, stores);
    let app = router::build_router(state);

    tracing::info!(%listen, "roomcast starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
