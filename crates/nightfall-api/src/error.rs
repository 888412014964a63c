//! Nightfall API — error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nightfall_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The roster file could not be read or parsed.
    #[error("roster error: {0}")]
    Roster(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
///
/// Soft rejections (a refused vote, a repeated elimination) are normally
/// answered by the route itself with `success: false`; they only reach this
/// type from routes that have no such body.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::PlayerNotFound(_) => (StatusCode::NOT_FOUND, "player_not_found"),
            DomainError::SubPhaseNotFound(_) => (StatusCode::NOT_FOUND, "sub_phase_not_found"),
            DomainError::InvalidVote(_) => (StatusCode::BAD_REQUEST, "invalid_vote"),
            DomainError::AlreadyEliminated(_) => (StatusCode::BAD_REQUEST, "already_eliminated"),
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn status_of(err: DomainError) -> StatusCode {
        let response = ApiError(err).into_response();
        response.status()
    }

    #[test]
    fn test_player_not_found_maps_to_404() {
        assert_eq!(
            status_of(DomainError::PlayerNotFound("ghost".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_sub_phase_not_found_maps_to_404() {
        assert_eq!(
            status_of(DomainError::SubPhaseNotFound("owls".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_validation_maps_to_400() {
        assert_eq!(
            status_of(DomainError::Validation("bad input".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_soft_rejections_map_to_400_when_not_handled_by_the_route() {
        assert_eq!(
            status_of(DomainError::InvalidVote("outside runoff".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::AlreadyEliminated("bob".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_infrastructure_maps_to_500() {
        assert_eq!(
            status_of(DomainError::Infrastructure("stream closed".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
