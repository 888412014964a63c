//! Routes for the day: phase change and the village vote.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use nightfall_session::application::command_handlers;
use nightfall_session::domain::aggregates::SessionState;
use nightfall_session::domain::commands;
use nightfall_voting::domain::tally::TallyResult;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /votes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    /// The voter.
    pub voter_id: String,
    /// The player voted against.
    pub target_id: String,
}

/// Request body for POST /votes/runoff.
#[derive(Debug, Deserialize)]
pub struct StartRunoffRequest {
    /// Players who may receive votes in the runoff.
    pub candidates: Vec<String>,
}

/// Response body for POST /votes.
#[derive(Debug, Serialize)]
pub struct VoteResponse {
    /// Whether the vote was recorded.
    pub success: bool,
    /// The count after the vote (unchanged when rejected).
    pub tally: TallyResult,
}

/// POST /day/start
#[instrument(skip(state))]
async fn start_day(State(state): State<AppState>) -> Result<Json<SessionState>, ApiError> {
    let command = commands::StartDay {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling start_day command");

    let session_state = state.with_session(|session, clock, publisher| {
        command_handlers::handle_start_day(&command, session, clock, publisher)
    })?;

    Ok(Json(session_state))
}

/// POST /votes
#[instrument(skip(state, request), fields(voter_id = %request.voter_id))]
async fn cast_vote(
    State(state): State<AppState>,
    Json(request): Json<CastVoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    let command = commands::CastVote {
        correlation_id: Uuid::new_v4(),
        voter_id: request.voter_id,
        target_id: request.target_id,
    };

    info!(correlation_id = %command.correlation_id, "handling cast_vote command");

    let response = state.with_session(|session, clock, publisher| {
        match command_handlers::handle_cast_vote(&command, session, clock, publisher) {
            Ok(tally) => Ok(VoteResponse {
                success: true,
                tally,
            }),
            Err(err) if err.is_soft_rejection() => {
                warn!(correlation_id = %command.correlation_id, error = %err, "vote refused");
                Ok(VoteResponse {
                    success: false,
                    tally: session.tally().tally(),
                })
            }
            Err(err) => Err(err),
        }
    })?;

    Ok(Json(response))
}

/// POST /votes/runoff
#[instrument(skip(state, request), fields(candidates = request.candidates.len()))]
async fn start_runoff(
    State(state): State<AppState>,
    Json(request): Json<StartRunoffRequest>,
) -> Result<Json<SessionState>, ApiError> {
    let command = commands::StartRunoff {
        correlation_id: Uuid::new_v4(),
        candidates: request.candidates,
    };

    info!(correlation_id = %command.correlation_id, "handling start_runoff command");

    let session_state = state.with_session(|session, clock, publisher| {
        command_handlers::handle_start_runoff(&command, session, clock, publisher)
    })?;

    Ok(Json(session_state))
}

/// Returns the router for the day.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/day/start", post(start_day))
        .route("/votes", post(cast_vote))
        .route("/votes/runoff", post(start_runoff))
}
