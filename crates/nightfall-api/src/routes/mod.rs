//! Route modules, one per area of the moderator's console.

pub mod day;
pub mod eliminations;
pub mod health;
pub mod night;
pub mod reset;
pub mod roles;
pub mod session;
pub mod stream;

use axum::Router;
use serde::Serialize;

use crate::state::AppState;

/// Response body for commands that only report acceptance.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    /// Whether the command was applied.
    pub success: bool,
}

/// Returns every `/api/v1` route.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(session::router())
        .merge(night::router())
        .merge(day::router())
        .merge(eliminations::router())
        .merge(roles::router())
        .merge(reset::router())
        .merge(stream::router())
}
