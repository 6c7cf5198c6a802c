//! Leaderboard backend entrypoint wiring REST, SSE and storage layers.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leaderboard_back::config::AppConfig;
use leaderboard_back::dao::team_store::{TeamStore, memory::MemoryTeamStore};
use leaderboard_back::routes;
use leaderboard_back::state::{AppState, SharedState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env();
    if config.uses_default_password() {
        warn!("running with the default admin password; set ADMIN_PASSWORD in production");
    }

    let app_state = AppState::new(config.clone());
    install_storage(&app_state).await;

    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Install the storage backend: supervised MongoDB when `MONGO_URI` is set,
/// the in-memory store otherwise.
async fn install_storage(state: &SharedState) {
    #[cfg(feature = "mongo-store")]
    if let Some(uri) = state.config().mongo_uri.clone() {
        use leaderboard_back::dao::team_store::mongodb::{MongoConfig, MongoTeamStore};
        use leaderboard_back::services::storage_supervisor;

        let db_name = state.config().mongo_db.clone();
        tokio::spawn(storage_supervisor::run(state.clone(), move || {
            let uri = uri.clone();
            let db_name = db_name.clone();
            async move {
                let config = MongoConfig::from_uri(&uri, db_name.as_deref()).await?;
                let store = MongoTeamStore::connect(config).await?;
                Ok(Arc::new(store) as Arc<dyn TeamStore>)
            }
        }));
        return;
    }

    info!("installing in-memory team store");
    state.set_team_store(Arc::new(MemoryTeamStore::new())).await;
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
