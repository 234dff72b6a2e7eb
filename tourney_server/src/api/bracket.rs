//! Bracket API handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tourney::{BracketView, Match, TournamentId};

use super::{AppState, error::ApiError};
use crate::metrics;

/// Seed the confirmed entries into a full bracket and start the tournament.
///
/// Returns `201 Created` with every match, ordered by round then position.
///
/// # Errors
///
/// - `409 Conflict`: tournament not PUBLISHED
/// - `422 Unprocessable Entity`: confirmed entry count isn't a power of two
pub async fn generate_bracket(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<(StatusCode, Json<Vec<Match>>), ApiError> {
    let matches = state
        .engine
        .brackets
        .generate_bracket(tournament_id)
        .await?;
    metrics::brackets_generated_total();
    Ok((StatusCode::CREATED, Json(matches)))
}

/// Round-by-round view with display names and scores.
pub async fn view_bracket(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<BracketView>, ApiError> {
    Ok(Json(
        state.engine.brackets.view_bracket(tournament_id).await?,
    ))
}
