//! Read access to the whole session.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use nightfall_session::application::query_handlers::{self, SessionSnapshot};
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /session
#[instrument(skip(state))]
async fn get_session(State(state): State<AppState>) -> Result<Json<SessionSnapshot>, ApiError> {
    let snapshot = state.with_session(|session, _, _| Ok(query_handlers::get_snapshot(session)))?;
    Ok(Json(snapshot))
}

/// Returns the router for session queries.
pub fn router() -> Router<AppState> {
    Router::new().route("/session", get(get_session))
}
