//! REST API implementation for the media player
//!
//! Commands come in over REST, session snapshots go out on demand, and the
//! render surface follows the event and command streams over SSE.

pub mod handlers;
pub mod sse;

use axum::{
    extract::State,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::bootstrap::PlayerSet;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub players: PlayerSet,
    pub port: u16,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check (no prefix for health endpoint)
        .route("/health", get(health_check))
        // API v1 routes
        .nest(
            "/api/v1",
            Router::new()
                // Playability affordance
                .route("/resolve", post(handlers::resolve_entry))
                // Audio engine
                .route("/audio/play", post(handlers::audio_play))
                .route("/audio/pause", post(handlers::audio_pause))
                .route("/audio/resume", post(handlers::audio_resume))
                .route("/audio/stop", post(handlers::audio_stop))
                .route("/audio/enqueue", post(handlers::audio_enqueue))
                .route("/audio/play-series", post(handlers::audio_play_series))
                .route("/audio/play-recent", post(handlers::audio_play_recent))
                .route("/audio/callback", post(handlers::audio_callback))
                .route("/audio/session", get(handlers::audio_session))
                .route("/audio/queue", get(handlers::audio_queue))
                .route(
                    "/audio/queue/:enclosure_id",
                    delete(handlers::audio_dequeue),
                )
                .route("/audio/queue/clear", post(handlers::audio_clear_queue))
                // Video engine
                .route("/video/play", post(handlers::video_play))
                .route("/video/play-youtube", post(handlers::video_play_youtube))
                .route("/video/pause", post(handlers::video_pause))
                .route("/video/resume", post(handlers::video_resume))
                .route("/video/stop", post(handlers::video_stop))
                .route("/video/enqueue", post(handlers::video_enqueue))
                .route("/video/play-series", post(handlers::video_play_series))
                .route("/video/play-recent", post(handlers::video_play_recent))
                .route("/video/callback", post(handlers::video_callback))
                .route("/video/session", get(handlers::video_session))
                .route("/video/queue", get(handlers::video_queue))
                .route(
                    "/video/queue/:enclosure_id",
                    delete(handlers::video_dequeue),
                )
                .route("/video/queue/clear", post(handlers::video_clear_queue))
                // SSE streams
                .route("/events", get(sse::event_stream))
                .route("/commands", get(sse::command_stream)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "tern-mp",
        "version": env!("CARGO_PKG_VERSION"),
        "port": state.port,
    }))
}
