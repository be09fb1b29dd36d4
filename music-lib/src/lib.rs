//! music-lib library - song catalog service
//!
//! Stores song metadata in Postgres, enriches new songs from an external
//! music info endpoint, and serves filtered, paginated listings over HTTP.

use axum::Router;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod enrichment;
pub mod models;
pub mod pagination;
pub mod query;
pub mod repository;
pub mod service;

use service::SongService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: SongService,
}

impl AppState {
    /// Create new application state
    pub fn new(service: SongService) -> Self {
        Self { service }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let songs = Router::new()
        .route("/api/songs", get(api::get_all_songs).post(api::add_song))
        .route(
            "/api/songs/:id",
            get(api::get_song_by_id)
                .put(api::update_song)
                .delete(api::delete_song),
        )
        .route("/api/songs/:id/text", get(api::get_song_text));

    Router::new()
        .merge(songs)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
