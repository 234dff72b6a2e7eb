//! Participant directory.
//!
//! Participants are owned outside the engine, which only reads them. This
//! endpoint lets operators seed the store the server runs on.

use async_trait::async_trait;
use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tourney::{EngineError, EngineResult, MemoryStore, Participant, ParticipantType, PgStore};
use uuid::Uuid;

use super::{AppState, error::ApiError};

/// Write access to the participants the engine looks up
#[async_trait]
pub trait ParticipantDirectory: Send + Sync {
    async fn save_participant(&self, participant: &Participant) -> EngineResult<()>;
}

#[async_trait]
impl ParticipantDirectory for MemoryStore {
    async fn save_participant(&self, participant: &Participant) -> EngineResult<()> {
        self.insert_participant(participant.clone()).await;
        Ok(())
    }
}

#[async_trait]
impl ParticipantDirectory for PgStore {
    async fn save_participant(&self, participant: &Participant) -> EngineResult<()> {
        self.upsert_participant(participant).await
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParticipantRequest {
    /// Caller-chosen id, generated when absent
    pub id: Option<Uuid>,
    pub participant_type: ParticipantType,
    pub display_name: String,
}

/// Create or replace a participant.
///
/// Returns `201 Created` with the stored participant.
pub async fn create_participant(
    State(state): State<AppState>,
    Json(request): Json<CreateParticipantRequest>,
) -> Result<(StatusCode, Json<Participant>), ApiError> {
    let display_name = request.display_name.trim();
    if display_name.is_empty() {
        return Err(EngineError::Validation("displayName must not be empty".to_string()).into());
    }

    let participant = Participant {
        id: request.id.unwrap_or_else(Uuid::new_v4),
        participant_type: request.participant_type,
        display_name: display_name.to_string(),
    };
    state.participants.save_participant(&participant).await?;

    Ok((StatusCode::CREATED, Json(participant)))
}
