//! Match API handlers.
//!
//! Record a result:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/tournaments/$T/matches/$M/result \
//!   -H "Content-Type: application/json" \
//!   -d '{"scores": [{"participantId": "…", "score": 3}, {"participantId": "…", "score": 1}]}'
//! ```
//!
//! A `409 Conflict` with "Concurrent modification detected" means a sibling
//! match was scored at the same moment; reload and retry.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tourney::{EngineError, Match, MatchId, ResultUpdate, ScoreInput, TournamentId};

use super::{AppState, error::ApiError};
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct ResultRequest {
    pub scores: [ScoreInput; 2],
}

pub async fn list_matches(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Vec<Match>>, ApiError> {
    Ok(Json(state.engine.matches.list_matches(tournament_id).await?))
}

pub async fn get_match(
    State(state): State<AppState>,
    Path((tournament_id, match_id)): Path<(TournamentId, MatchId)>,
) -> Result<Json<Match>, ApiError> {
    Ok(Json(match_in(&state, tournament_id, match_id).await?))
}

/// Score an open match and advance its winner.
pub async fn record_result(
    State(state): State<AppState>,
    Path((tournament_id, match_id)): Path<(TournamentId, MatchId)>,
    Json(request): Json<ResultRequest>,
) -> Result<Json<ResultUpdate>, ApiError> {
    match_in(&state, tournament_id, match_id).await?;
    let update = state
        .engine
        .matches
        .record_result(match_id, request.scores)
        .await?;
    Ok(Json(counted("record", update)))
}

/// Replace the scores of a completed match.
pub async fn edit_result(
    State(state): State<AppState>,
    Path((tournament_id, match_id)): Path<(TournamentId, MatchId)>,
    Json(request): Json<ResultRequest>,
) -> Result<Json<ResultUpdate>, ApiError> {
    match_in(&state, tournament_id, match_id).await?;
    let update = state
        .engine
        .matches
        .edit_result(match_id, request.scores)
        .await?;
    Ok(Json(counted("edit", update)))
}

/// Clear the result of a completed match.
pub async fn annul_result(
    State(state): State<AppState>,
    Path((tournament_id, match_id)): Path<(TournamentId, MatchId)>,
) -> Result<Json<ResultUpdate>, ApiError> {
    match_in(&state, tournament_id, match_id).await?;
    let update = state.engine.matches.annul_result(match_id).await?;
    Ok(Json(counted("annul", update)))
}

/// Load a match, treating one from another tournament as missing
async fn match_in(
    state: &AppState,
    tournament_id: TournamentId,
    match_id: MatchId,
) -> Result<Match, ApiError> {
    let m = state.engine.matches.get_match(match_id).await?;
    if m.tournament_id != tournament_id {
        return Err(EngineError::MatchNotFound(match_id).into());
    }
    Ok(m)
}

fn counted(kind: &'static str, update: ResultUpdate) -> ResultUpdate {
    metrics::match_results_total(kind);
    if update.completed_tournament.is_some() {
        metrics::tournaments_completed_total();
    }
    update
}
