//! Routes for the night: countdown, sub-phase schedule and the wolves'
//! ballot.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use nightfall_session::application::command_handlers::{self, NightView};
use nightfall_session::domain::commands;
use nightfall_timer::domain::scheduler::SubPhase;
use nightfall_voting::domain::ballot::BallotView;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /night/start.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartNightRequest {
    /// Night length in seconds; the configured default when omitted.
    #[serde(default)]
    pub total_seconds: Option<u32>,
    /// 1-based night index.
    pub night_number: u32,
}

/// Request body for POST /night/skip.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipPhaseRequest {
    /// The running sub-phase to end.
    pub sub_phase_id: String,
}

/// Request body for POST /night/duration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDurationRequest {
    /// New night length in seconds.
    pub total_seconds: u32,
}

/// Request body for POST /night/votes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NightVoteRequest {
    /// The voting wolf.
    pub wolf_id: String,
    /// Its chosen victim.
    pub victim_id: String,
}

/// Request body for POST /night/victim.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignateVictimRequest {
    /// The victim, or `null` to clear it.
    #[serde(default)]
    pub victim_id: Option<String>,
}

/// Response body carrying the night's schedule.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubPhasesResponse {
    /// Tonight's sub-phases after the change.
    pub sub_phases: Vec<SubPhase>,
}

/// POST /night/start
#[instrument(skip(state, request), fields(night_number = request.night_number))]
async fn start_night(
    State(state): State<AppState>,
    Json(request): Json<StartNightRequest>,
) -> Result<Json<NightView>, ApiError> {
    let view = state.with_session(|session, clock, publisher| {
        let command = commands::StartNight {
            correlation_id: Uuid::new_v4(),
            total_seconds: request
                .total_seconds
                .unwrap_or_else(|| session.countdown().total()),
            night_number: request.night_number,
        };

        info!(correlation_id = %command.correlation_id, "handling start_night command");

        command_handlers::handle_start_night(&command, session, clock, publisher)
    })?;

    Ok(Json(view))
}

/// POST /night/skip
#[instrument(skip(state, request), fields(sub_phase_id = %request.sub_phase_id))]
async fn skip_phase(
    State(state): State<AppState>,
    Json(request): Json<SkipPhaseRequest>,
) -> Result<Json<SubPhasesResponse>, ApiError> {
    let command = commands::SkipPhase {
        correlation_id: Uuid::new_v4(),
        sub_phase_id: request.sub_phase_id,
    };

    info!(correlation_id = %command.correlation_id, "handling skip_phase command");

    let sub_phases = state.with_session(|session, clock, publisher| {
        command_handlers::handle_skip_phase(&command, session, clock, publisher)
    })?;

    Ok(Json(SubPhasesResponse { sub_phases }))
}

/// POST /night/duration
#[instrument(skip(state, request), fields(total_seconds = request.total_seconds))]
async fn change_duration(
    State(state): State<AppState>,
    Json(request): Json<ChangeDurationRequest>,
) -> Result<Json<NightView>, ApiError> {
    let command = commands::ChangeDuration {
        correlation_id: Uuid::new_v4(),
        total_seconds: request.total_seconds,
    };

    info!(correlation_id = %command.correlation_id, "handling change_duration command");

    let view = state.with_session(|session, clock, publisher| {
        command_handlers::handle_change_duration(&command, session, clock, publisher)
    })?;

    Ok(Json(view))
}

/// POST /night/votes
#[instrument(skip(state, request), fields(wolf_id = %request.wolf_id))]
async fn cast_night_vote(
    State(state): State<AppState>,
    Json(request): Json<NightVoteRequest>,
) -> Result<Json<BallotView>, ApiError> {
    let command = commands::CastNightVote {
        correlation_id: Uuid::new_v4(),
        wolf_id: request.wolf_id,
        victim_id: request.victim_id,
    };

    info!(correlation_id = %command.correlation_id, "handling cast_night_vote command");

    let ballot = state.with_session(|session, clock, publisher| {
        command_handlers::handle_cast_night_vote(&command, session, clock, publisher)
    })?;

    Ok(Json(ballot))
}

/// POST /night/victim
#[instrument(skip(state, request))]
async fn designate_victim(
    State(state): State<AppState>,
    Json(request): Json<DesignateVictimRequest>,
) -> Result<Json<BallotView>, ApiError> {
    let command = commands::DesignateVictim {
        correlation_id: Uuid::new_v4(),
        victim_id: request.victim_id,
    };

    info!(correlation_id = %command.correlation_id, "handling designate_victim command");

    let ballot = state.with_session(|session, clock, publisher| {
        command_handlers::handle_designate_victim(&command, session, clock, publisher)
    })?;

    Ok(Json(ballot))
}

/// Returns the router for the night.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/night/start", post(start_night))
        .route("/night/skip", post(skip_phase))
        .route("/night/duration", post(change_duration))
        .route("/night/votes", post(cast_night_vote))
        .route("/night/victim", post(designate_victim))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use super::*;
    use crate::routes::test_helpers::{post, test_app_state};

    fn phase<'a>(json: &'a Value, id: &str) -> &'a Value {
        json["subPhases"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["id"] == id)
            .unwrap()
    }

    #[tokio::test]
    async fn test_start_night_returns_schedule_and_running_countdown() {
        // Arrange
        let app = router().with_state(test_app_state());

        // Act
        let (status, json) = post(
            app,
            "/night/start",
            &json!({ "totalSeconds": 3600, "nightNumber": 1 }),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["totalSeconds"], 3600);
        assert_eq!(json["remaining"], 3600);
        assert_eq!(json["running"], true);
        assert_eq!(phase(&json, "wolves")["duration"], 1800);
        assert_eq!(phase(&json, "seer")["duration"], 3600);
    }

    #[tokio::test]
    async fn test_start_night_defaults_to_configured_length() {
        let app = router().with_state(test_app_state());

        let (status, json) = post(app, "/night/start", &json!({ "nightNumber": 2 })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["totalSeconds"], 3600);
        assert!(
            json["subPhases"]
                .as_array()
                .unwrap()
                .iter()
                .all(|p| p["id"] != "white-wolf")
        );
    }

    #[tokio::test]
    async fn test_start_night_with_zero_length_returns_400() {
        let app = router().with_state(test_app_state());

        let (status, json) = post(
            app,
            "/night/start",
            &json!({ "totalSeconds": 0, "nightNumber": 1 }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_skip_wolves_hands_the_window_to_the_next_group() {
        // Arrange
        let state = test_app_state();
        let (status, _) = post(
            router().with_state(state.clone()),
            "/night/start",
            &json!({ "totalSeconds": 3600, "nightNumber": 1 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // Act
        let (status, json) = post(
            router().with_state(state),
            "/night/skip",
            &json!({ "subPhaseId": "wolves" }),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(phase(&json, "wolves")["skipped"], true);
        assert_eq!(phase(&json, "wolves")["duration"], 0);
        assert_eq!(phase(&json, "infect-father")["startOffset"], 0);
        assert_eq!(phase(&json, "infect-father")["duration"], 2700);
    }

    #[tokio::test]
    async fn test_skip_unknown_phase_returns_404() {
        let state = test_app_state();
        post(
            router().with_state(state.clone()),
            "/night/start",
            &json!({ "nightNumber": 1 }),
        )
        .await;

        let (status, json) = post(
            router().with_state(state),
            "/night/skip",
            &json!({ "subPhaseId": "owls" }),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "sub_phase_not_found");
    }

    #[tokio::test]
    async fn test_skip_outside_a_night_returns_400() {
        let app = router().with_state(test_app_state());

        let (status, _) = post(app, "/night/skip", &json!({ "subPhaseId": "wolves" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_change_duration_relays_out_the_night() {
        let state = test_app_state();
        post(
            router().with_state(state.clone()),
            "/night/start",
            &json!({ "totalSeconds": 3600, "nightNumber": 1 }),
        )
        .await;

        let (status, json) = post(
            router().with_state(state),
            "/night/duration",
            &json!({ "totalSeconds": 1200 }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["totalSeconds"], 1200);
        assert_eq!(phase(&json, "wolves")["duration"], 600);
    }

    #[tokio::test]
    async fn test_night_votes_and_victim_update_the_ballot() {
        // Arrange
        let state = test_app_state();

        // Act
        let (status, voted) = post(
            router().with_state(state.clone()),
            "/night/votes",
            &json!({ "wolfId": "bob", "victimId": "carol" }),
        )
        .await;
        let (_, designated) = post(
            router().with_state(state),
            "/night/victim",
            &json!({ "victimId": "carol" }),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(voted["majorityVictim"], "carol");
        assert_eq!(designated["victim"], "carol");
    }

    #[tokio::test]
    async fn test_malformed_body_returns_422() {
        let app = router().with_state(test_app_state());

        let (status, _) = post(app, "/night/start", &json!({ "nightNumber": "first" })).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
