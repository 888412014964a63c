//! Routes for role bookkeeping: wild-child bindings, wolf-dog camps and the
//! mayor.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use nightfall_elimination::domain::camps::Camp;
use nightfall_elimination::domain::engine::RoleBinding;
use nightfall_session::application::command_handlers;
use nightfall_session::domain::commands;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::SuccessResponse;
use crate::state::AppState;

/// Request body for POST /roles/bind.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindRoleRequest {
    /// The wild child.
    pub subject_id: String,
    /// Its chosen master.
    pub master_id: String,
}

/// Request body for POST /roles/camp.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChooseCampRequest {
    /// The wolf-dog.
    pub player_id: String,
    /// The camp it joins.
    pub camp: Camp,
}

/// Request body for POST /roles/mayor.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointMayorRequest {
    /// The new mayor.
    pub player_id: String,
}

/// POST /roles/bind
#[instrument(skip(state, request), fields(subject_id = %request.subject_id))]
async fn bind_role(
    State(state): State<AppState>,
    Json(request): Json<BindRoleRequest>,
) -> Result<Json<RoleBinding>, ApiError> {
    let command = commands::BindRole {
        correlation_id: Uuid::new_v4(),
        subject_id: request.subject_id,
        master_id: request.master_id,
    };

    info!(correlation_id = %command.correlation_id, "handling bind_role command");

    let binding = state.with_session(|session, clock, publisher| {
        command_handlers::handle_bind_role(&command, session, clock, publisher)
    })?;

    Ok(Json(binding))
}

/// POST /roles/camp
#[instrument(skip(state, request), fields(player_id = %request.player_id))]
async fn choose_camp(
    State(state): State<AppState>,
    Json(request): Json<ChooseCampRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let command = commands::ChooseCamp {
        correlation_id: Uuid::new_v4(),
        player_id: request.player_id,
        camp: request.camp,
    };

    info!(correlation_id = %command.correlation_id, "handling choose_camp command");

    state.with_session(|session, clock, publisher| {
        command_handlers::handle_choose_camp(&command, session, clock, publisher)
    })?;

    Ok(Json(SuccessResponse { success: true }))
}

/// POST /roles/mayor
#[instrument(skip(state, request), fields(player_id = %request.player_id))]
async fn appoint_mayor(
    State(state): State<AppState>,
    Json(request): Json<AppointMayorRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let command = commands::AppointMayor {
        correlation_id: Uuid::new_v4(),
        player_id: request.player_id,
    };

    info!(correlation_id = %command.correlation_id, "handling appoint_mayor command");

    state.with_session(|session, clock, publisher| {
        command_handlers::handle_appoint_mayor(&command, session, clock, publisher)
    })?;

    Ok(Json(SuccessResponse { success: true }))
}

/// Returns the router for role bookkeeping.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/roles/bind", post(bind_role))
        .route("/roles/camp", post(choose_camp))
        .route("/roles/mayor", post(appoint_mayor))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::routes::test_helpers::{post, test_app_state};

    #[tokio::test]
    async fn test_bind_role_returns_unswitched_binding() {
        let app = router().with_state(test_app_state());

        let (status, json) = post(
            app,
            "/roles/bind",
            &json!({ "subjectId": "dave", "masterId": "alice" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["subjectId"], "dave");
        assert_eq!(json["masterId"], "alice");
        assert_eq!(json["switched"], false);
    }

    #[tokio::test]
    async fn test_bind_role_to_self_returns_400() {
        let app = router().with_state(test_app_state());

        let (status, _) = post(
            app,
            "/roles/bind",
            &json!({ "subjectId": "dave", "masterId": "dave" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_choose_camp_twice_returns_400() {
        // Arrange
        let state = test_app_state();
        let (first, _) = post(
            router().with_state(state.clone()),
            "/roles/camp",
            &json!({ "playerId": "carol", "camp": "wolves" }),
        )
        .await;

        // Act
        let (second, json) = post(
            router().with_state(state),
            "/roles/camp",
            &json!({ "playerId": "carol", "camp": "village" }),
        )
        .await;

        // Assert
        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_appoint_mayor_of_unknown_player_returns_404() {
        let app = router().with_state(test_app_state());

        let (status, _) = post(app, "/roles/mayor", &json!({ "playerId": "ghost" })).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_appoint_mayor_succeeds() {
        let state = test_app_state();

        let (status, json) = post(
            router().with_state(state.clone()),
            "/roles/mayor",
            &json!({ "playerId": "alice" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        let mayor = state
            .with_session(|session, _, _| Ok(session.roster().mayor().map(|p| p.id.clone())))
            .unwrap();
        assert_eq!(mayor.as_deref(), Some("alice"));
    }
}
