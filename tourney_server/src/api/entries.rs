//! Registration API handlers.
//!
//! Register a participant:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/tournaments/$T/entries \
//!   -H "Content-Type: application/json" \
//!   -d '{"participantId": "7b0d…"}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tourney::{
    EngineError, EntryStatus, ParticipantId, TournamentEntry, TournamentId,
    tournament::EntryId,
};

use super::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterEntryRequest {
    pub participant_id: ParticipantId,
    /// PENDING or CONFIRMED, defaults to CONFIRMED
    #[serde(default)]
    pub status: Option<EntryStatus>,
}

pub async fn list_entries(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> Result<Json<Vec<TournamentEntry>>, ApiError> {
    Ok(Json(
        state.engine.tournaments.list_entries(tournament_id).await?,
    ))
}

/// Register a participant, or re-activate their withdrawn entry.
///
/// Returns `201 Created` with the entry.
///
/// # Errors
///
/// - `404 Not Found`: unknown tournament or participant
/// - `409 Conflict`: closed registration, duplicate, or a full tournament
/// - `422 Unprocessable Entity`: participant type not accepted
pub async fn register_entry(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
    Json(request): Json<RegisterEntryRequest>,
) -> Result<(StatusCode, Json<TournamentEntry>), ApiError> {
    let entry = state
        .engine
        .tournaments
        .register_entry(tournament_id, request.participant_id, request.status)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Withdraw a participant's entry while the tournament hasn't started.
pub async fn withdraw_entry(
    State(state): State<AppState>,
    Path((tournament_id, participant_id)): Path<(TournamentId, ParticipantId)>,
) -> Result<Json<TournamentEntry>, ApiError> {
    Ok(Json(
        state
            .engine
            .tournaments
            .withdraw_entry(tournament_id, participant_id)
            .await?,
    ))
}

pub async fn confirm_entry(
    State(state): State<AppState>,
    Path((tournament_id, entry_id)): Path<(TournamentId, EntryId)>,
) -> Result<Json<TournamentEntry>, ApiError> {
    ensure_entry_in(&state, tournament_id, entry_id).await?;
    Ok(Json(state.engine.tournaments.confirm_entry(entry_id).await?))
}

pub async fn cancel_entry(
    State(state): State<AppState>,
    Path((tournament_id, entry_id)): Path<(TournamentId, EntryId)>,
) -> Result<Json<TournamentEntry>, ApiError> {
    ensure_entry_in(&state, tournament_id, entry_id).await?;
    Ok(Json(state.engine.tournaments.cancel_entry(entry_id).await?))
}

/// Entries addressed under another tournament's path are not found
async fn ensure_entry_in(
    state: &AppState,
    tournament_id: TournamentId,
    entry_id: EntryId,
) -> Result<(), ApiError> {
    let entries = state.engine.tournaments.list_entries(tournament_id).await?;
    if entries.iter().any(|e| e.id == entry_id) {
        Ok(())
    } else {
        Err(EngineError::EntryNotFound(entry_id).into())
    }
}
