//! Routes for eliminations and resurrections.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use nightfall_elimination::domain::engine::{
    Elimination, EliminationReason, EliminationSource, RoleSwitch,
};
use nightfall_session::application::command_handlers;
use nightfall_session::domain::commands;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::SuccessResponse;
use crate::state::AppState;

fn default_source() -> EliminationSource {
    EliminationSource::Admin
}

fn default_reason() -> EliminationReason {
    EliminationReason::Admin
}

/// Request body for POST /eliminations.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EliminateRequest {
    /// The player to eliminate.
    pub player_id: String,
    /// Who caused it; the moderator when omitted.
    #[serde(default = "default_source")]
    pub source: EliminationSource,
    /// Why; a moderator decision when omitted.
    #[serde(default = "default_reason")]
    pub reason: EliminationReason,
    /// Free-form note.
    #[serde(default)]
    pub details: Option<String>,
}

/// Request body for POST /eliminations/resurrect.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResurrectRequest {
    /// The player to bring back.
    pub player_id: String,
}

/// Response body for POST /eliminations.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EliminationResponse {
    /// Whether the player was eliminated by this request.
    pub success: bool,
    /// The new log entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elimination: Option<Elimination>,
    /// Roles changed by the elimination's cascade.
    pub role_switches: Vec<RoleSwitch>,
}

/// POST /eliminations
#[instrument(skip(state, request), fields(player_id = %request.player_id))]
async fn eliminate(
    State(state): State<AppState>,
    Json(request): Json<EliminateRequest>,
) -> Result<Json<EliminationResponse>, ApiError> {
    let command = commands::EliminatePlayer {
        correlation_id: Uuid::new_v4(),
        player_id: request.player_id,
        source: request.source,
        reason: request.reason,
        details: request.details,
    };

    info!(correlation_id = %command.correlation_id, "handling eliminate_player command");

    let response = state.with_session(|session, clock, publisher| {
        match command_handlers::handle_eliminate_player(&command, session, clock, publisher) {
            Ok(outcome) => Ok(EliminationResponse {
                success: true,
                elimination: Some(outcome.elimination),
                role_switches: outcome.role_switches,
            }),
            Err(err) if err.is_soft_rejection() => {
                warn!(correlation_id = %command.correlation_id, error = %err, "elimination refused");
                Ok(EliminationResponse {
                    success: false,
                    elimination: None,
                    role_switches: Vec::new(),
                })
            }
            Err(err) => Err(err),
        }
    })?;

    Ok(Json(response))
}

/// POST /eliminations/resurrect
#[instrument(skip(state, request), fields(player_id = %request.player_id))]
async fn resurrect(
    State(state): State<AppState>,
    Json(request): Json<ResurrectRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let command = commands::ResurrectPlayer {
        correlation_id: Uuid::new_v4(),
        player_id: request.player_id,
    };

    info!(correlation_id = %command.correlation_id, "handling resurrect_player command");

    state.with_session(|session, clock, publisher| {
        command_handlers::handle_resurrect_player(&command, session, clock, publisher)
    })?;

    Ok(Json(SuccessResponse { success: true }))
}

/// Returns the router for eliminations.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/eliminations", post(eliminate))
        .route("/eliminations/resurrect", post(resurrect))
}
