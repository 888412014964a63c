//! Routes that clear part or all of the game.
//!
//! Each reset answers with the session snapshot so the console can redraw
//! without a second request.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use nightfall_session::application::command_handlers;
use nightfall_session::application::query_handlers::{self, SessionSnapshot};
use nightfall_session::domain::commands;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /reset/day
#[instrument(skip(state))]
async fn reset_day(State(state): State<AppState>) -> Result<Json<SessionSnapshot>, ApiError> {
    let command = commands::ResetDay {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling reset_day command");

    let snapshot = state.with_session(|session, clock, publisher| {
        command_handlers::handle_reset_day(&command, session, clock, publisher)?;
        Ok(query_handlers::get_snapshot(session))
    })?;

    Ok(Json(snapshot))
}

/// POST /reset/night
#[instrument(skip(state))]
async fn reset_night(State(state): State<AppState>) -> Result<Json<SessionSnapshot>, ApiError> {
    let command = commands::ResetNight {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling reset_night command");

    let snapshot = state.with_session(|session, clock, publisher| {
        command_handlers::handle_reset_night(&command, session, clock, publisher)?;
        Ok(query_handlers::get_snapshot(session))
    })?;

    Ok(Json(snapshot))
}

/// POST /reset/session
#[instrument(skip(state))]
async fn reset_session(
    State(state): State<AppState>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let command = commands::ResetSession {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling reset_session command");

    let roster = state.roster.clone();
    let snapshot = state.with_session(|session, clock, publisher| {
        command_handlers::handle_reset_session(
            &command,
            session,
            clock,
            roster.as_ref(),
            publisher,
        )?;
        Ok(query_handlers::get_snapshot(session))
    })?;

    Ok(Json(snapshot))
}

/// Returns the router for resets.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reset/day", post(reset_day))
        .route("/reset/night", post(reset_night))
        .route("/reset/session", post(reset_session))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use nightfall_elimination::domain::engine::{EliminationReason, EliminationSource};
    use nightfall_session::domain::aggregates::GameSession;
    use nightfall_test_support::{FixedClock, StaticRoster, village_of};
    use serde_json::json;

    use super::*;
    use crate::routes::test_helpers::{post, seats, test_app_state};

    #[tokio::test]
    async fn test_reset_day_clears_votes() {
        // Arrange
        let state = test_app_state();
        state
            .with_session(|session, clock, _| {
                session.cast_vote(Uuid::new_v4(), clock, "alice", "bob")?;
                Ok(())
            })
            .unwrap();

        // Act
        let (status, json) = post(router().with_state(state), "/reset/day", &json!({})).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["votes"], json!({}));
        assert_eq!(json["tally"]["winner"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_reset_night_stops_the_countdown_and_clears_the_schedule() {
        // Arrange
        let state = test_app_state();
        state
            .with_session(|session, clock, _| session.start_night(Uuid::new_v4(), clock, 600, 1))
            .unwrap();

        // Act
        let (status, json) = post(router().with_state(state), "/reset/night", &json!({})).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["countdown"]["running"], false);
        assert_eq!(json["countdown"]["remaining"], 600);
        assert_eq!(json["subPhases"], json!([]));
    }

    #[tokio::test]
    async fn test_reset_session_reseats_players_from_the_roster() {
        // Arrange
        let roster = Arc::new(StaticRoster::new(seats()));
        let state = AppState::new(
            GameSession::new(Uuid::new_v4(), seats()),
            Arc::new(FixedClock::default()),
            roster.clone(),
        );
        state
            .with_session(|session, clock, _| {
                session
                    .eliminate(
                        Uuid::new_v4(),
                        clock,
                        "carol",
                        EliminationSource::Vote,
                        EliminationReason::Vote,
                        None,
                    )
                    .map(|_| ())
            })
            .unwrap();
        roster.replace(village_of(&[("erin", "Voyante"), ("frank", "Loup-Garou")]));

        // Act
        let (status, json) =
            post(router().with_state(state), "/reset/session", &json!({})).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["state"]["phase"], "lobby");
        assert_eq!(json["eliminations"], json!([]));
        assert_eq!(json["players"].as_array().unwrap().len(), 2);
        assert_eq!(json["players"][0]["id"], "erin");
    }
}
