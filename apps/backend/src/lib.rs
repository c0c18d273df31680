pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use matchup_core::PreferenceStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::services::lessons::LessonStore;
use crate::services::sessions::SessionRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub lessons: Arc<LessonStore>,
    pub sessions: Arc<SessionRegistry>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub async fn new(config: ServerConfig) -> error::Result<Self> {
        let lessons = LessonStore::open(config.lesson_dir.clone()).await?;
        let preferences = services::preferences::open_store(config.preferences_path.clone());
        Ok(Self {
            lessons: Arc::new(lessons),
            sessions: Arc::new(SessionRegistry::new(config.session_ttl())),
            preferences,
            config: Arc::new(config),
        })
    }
}

/// Build the full router without transport layers.
pub fn build_router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/api/sessions", post(routes::sessions::start))
        .route(
            "/api/sessions/{id}",
            get(routes::sessions::get).delete(routes::sessions::delete),
        )
        .route("/api/sessions/{id}/click", post(routes::sessions::click))
        .route("/api/sessions/{id}/place", post(routes::sessions::place))
        .route("/api/sessions/{id}/return", post(routes::sessions::return_to_pool))
        .route("/api/sessions/{id}/drag/start", post(routes::sessions::drag_start))
        .route("/api/sessions/{id}/drag/move", post(routes::sessions::drag_move))
        .route("/api/sessions/{id}/drag/end", post(routes::sessions::drag_end))
        .route("/api/sessions/{id}/drag/cancel", post(routes::sessions::drag_cancel))
        .route("/api/sessions/{id}/submit", post(routes::sessions::submit))
        .route("/api/sessions/{id}/reset", post(routes::sessions::reset))
        .route("/api/sessions/{id}/mute", post(routes::sessions::toggle_mute));

    Router::new()
        .route("/health", get(health_check))
        // Lesson routes
        .route("/api/lessons", get(routes::lessons::list))
        .route(
            "/api/lessons/{id}",
            get(routes::lessons::get).put(routes::lessons::save),
        )
        // Preference routes
        .route(
            "/api/preferences",
            get(routes::preferences::get).put(routes::preferences::update),
        )
        .merge(session_routes)
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    tracing::info!(dir = %config.lesson_dir.display(), "Opening lesson store...");
    let state = AppState::new(config).await?;
    let addr = state.config.addr();
    if let Some(ttl) = state.config.session_ttl() {
        state.sessions.spawn_reaper(ttl / 2);
    }

    let app = build_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
