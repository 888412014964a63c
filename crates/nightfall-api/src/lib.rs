//! Nightfall API — HTTP and WebSocket adapter around one game session.

pub mod config;
pub mod error;
pub mod roster;
pub mod routes;
pub mod state;
pub mod ticker;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router.
pub fn build_app(app_state: AppState) -> Router {
    // TODO: Replace CorsLayer::permissive() with the moderator UI's origin once it is hosted.
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
