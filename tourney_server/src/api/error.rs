//! Mapping of engine errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tourney::EngineError;

use crate::logging::log_storage_failure;

/// Body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler error wrapping an [`EngineError`]
#[derive(Debug)]
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError(err)
    }
}

/// HTTP status for an engine error
pub fn status_for(err: &EngineError) -> StatusCode {
    match err {
        e if e.is_not_found() => StatusCode::NOT_FOUND,

        EngineError::Validation(_) => StatusCode::BAD_REQUEST,

        EngineError::InvalidParticipantCount(_)
        | EngineError::ParticipantNotInMatch(_)
        | EngineError::ParticipantTypeNotAllowed
        | EngineError::UnsupportedFormat(_) => StatusCode::UNPROCESSABLE_ENTITY,

        EngineError::InvalidStateTransition { .. }
        | EngineError::DuplicateRegistration(_)
        | EngineError::TournamentFull { .. }
        | EngineError::MatchAlreadyCompleted(_)
        | EngineError::MatchNotCompleted(_)
        | EngineError::DownstreamMatchCompleted(_)
        | EngineError::Conflict => StatusCode::CONFLICT,

        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            log_storage_failure("api", &self.0);
        }

        let body = ErrorResponse {
            error: self.0.client_message(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_not_found_statuses() {
        assert_eq!(
            status_for(&EngineError::TournamentNotFound(Uuid::nil())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&EngineError::NotRegistered(Uuid::nil())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_lifecycle_errors_conflict() {
        assert_eq!(status_for(&EngineError::Conflict), StatusCode::CONFLICT);
        assert_eq!(
            status_for(&EngineError::TournamentFull { max: 8 }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&EngineError::DownstreamMatchCompleted(Uuid::nil())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_input_errors() {
        assert_eq!(
            status_for(&EngineError::Validation("name".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&EngineError::InvalidParticipantCount(3)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_storage_errors_are_sanitized() {
        let response = ApiError(EngineError::Corrupt("bad slot 'x'".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
