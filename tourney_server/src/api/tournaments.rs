//! Tournament API handlers.
//!
//! Create a draft tournament:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/tournaments \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Spring Open", "discipline": "chess", "maxParticipants": 16}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tourney::{NewTournament, Tournament, TournamentId};

use super::{AppState, error::ApiError};

/// Create a tournament.
///
/// Returns `201 Created`. Validation failures answer `400 Bad Request`.
pub async fn create_tournament(
    State(state): State<AppState>,
    Json(input): Json<NewTournament>,
) -> Result<(StatusCode, Json<Tournament>), ApiError> {
    let tournament = state.engine.tournaments.create_tournament(input).await?;
    Ok((StatusCode::CREATED, Json(tournament)))
}

pub async fn list_tournaments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Tournament>>, ApiError> {
    Ok(Json(state.engine.tournaments.list_tournaments().await?))
}

pub async fn get_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Tournament>, ApiError> {
    Ok(Json(
        state.engine.tournaments.get_tournament(tournament_id).await?,
    ))
}

/// Move a draft to PUBLISHED, opening registration.
pub async fn publish_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Tournament>, ApiError> {
    Ok(Json(
        state
            .engine
            .tournaments
            .publish_tournament(tournament_id)
            .await?,
    ))
}

/// Cancel a tournament that hasn't completed.
pub async fn cancel_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Tournament>, ApiError> {
    Ok(Json(
        state
            .engine
            .tournaments
            .cancel_tournament(tournament_id)
            .await?,
    ))
}
