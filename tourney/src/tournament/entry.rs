//! Tournament entries and their lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use super::models::{ParticipantId, TournamentId};
use crate::errors::{EngineError, EngineResult};

/// Entry ID type
pub type EntryId = Uuid;

/// Entry state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    Pending,
    Confirmed,
    Withdrawn,
    Cancelled,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "PENDING",
            EntryStatus::Confirmed => "CONFIRMED",
            EntryStatus::Withdrawn => "WITHDRAWN",
            EntryStatus::Cancelled => "CANCELLED",
        }
    }

    /// Whether the entry holds a seat against `max_participants`
    pub fn occupies_seat(&self) -> bool {
        *self != EntryStatus::Withdrawn
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(EntryStatus::Pending),
            "CONFIRMED" => Ok(EntryStatus::Confirmed),
            "WITHDRAWN" => Ok(EntryStatus::Withdrawn),
            "CANCELLED" => Ok(EntryStatus::Cancelled),
            other => Err(EngineError::Corrupt(format!("unknown entry status '{other}'"))),
        }
    }
}

/// A participant's registration in one tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentEntry {
    pub id: EntryId,
    pub tournament_id: TournamentId,
    pub participant_id: ParticipantId,
    pub(crate) status: EntryStatus,
    /// 1-based, unique and increasing within a tournament
    pub seed: u32,
    pub group_id: Option<Uuid>,
    pub registered_at: DateTime<Utc>,
    pub version: i64,
}

impl TournamentEntry {
    pub fn new(
        id: EntryId,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
        seed: u32,
        status: EntryStatus,
        now: DateTime<Utc>,
    ) -> EngineResult<Self> {
        if !matches!(status, EntryStatus::Pending | EntryStatus::Confirmed) {
            return Err(EngineError::transition("register an entry as", status));
        }

        Ok(Self {
            id,
            tournament_id,
            participant_id,
            status,
            seed,
            group_id: None,
            registered_at: now,
            version: 0,
        })
    }

    pub fn status(&self) -> EntryStatus {
        self.status
    }

    pub fn confirm(&mut self) -> EngineResult<()> {
        if self.status != EntryStatus::Pending {
            return Err(EngineError::transition("confirm entry", self.status));
        }
        self.status = EntryStatus::Confirmed;
        Ok(())
    }

    pub fn withdraw(&mut self) -> EngineResult<()> {
        if !matches!(self.status, EntryStatus::Pending | EntryStatus::Confirmed) {
            return Err(EngineError::transition("withdraw entry", self.status));
        }
        self.status = EntryStatus::Withdrawn;
        Ok(())
    }

    pub fn cancel(&mut self) -> EngineResult<()> {
        if !matches!(self.status, EntryStatus::Pending | EntryStatus::Confirmed) {
            return Err(EngineError::transition("cancel entry", self.status));
        }
        self.status = EntryStatus::Cancelled;
        Ok(())
    }

    /// Bring a withdrawn entry back, keeping its id and seed
    pub fn reactivate(&mut self, status: EntryStatus) -> EngineResult<()> {
        if self.status != EntryStatus::Withdrawn {
            return Err(EngineError::transition("reactivate entry", self.status));
        }
        if !matches!(status, EntryStatus::Pending | EntryStatus::Confirmed) {
            return Err(EngineError::transition("reactivate entry as", status));
        }
        self.status = status;
        Ok(())
    }
}

/// Next seed for a tournament: highest existing seed + 1
pub fn next_seed(entries: &[TournamentEntry]) -> u32 {
    entries.iter().map(|e| e.seed).max().unwrap_or(0) + 1
}
