//! Engine error types.

use thiserror::Error;

use crate::{
    matches::MatchId,
    tournament::{EntryId, ParticipantId, TournamentId},
};

/// Errors raised by the bracket engine.
///
/// Every operation either succeeds or returns exactly one of these; nothing is
/// retried internally.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A persisted row could not be mapped back onto an entity
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    #[error("Tournament entry not found: {0}")]
    EntryNotFound(EntryId),

    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("Participant not found: {0}")]
    ParticipantNotFound(ParticipantId),

    #[error("Participant {0} is not registered in this tournament")]
    NotRegistered(ParticipantId),

    /// A lifecycle guard was violated
    #[error("Cannot {action} while {state}")]
    InvalidStateTransition {
        action: &'static str,
        state: String,
    },

    #[error("Participant {0} is already registered")]
    DuplicateRegistration(ParticipantId),

    #[error("Tournament is full ({max} participants)")]
    TournamentFull { max: u32 },

    /// Bracket generation needs at least two entries and a power of two
    #[error("Invalid participant count: {0} (need a power of two, at least 2)")]
    InvalidParticipantCount(usize),

    #[error("Participant {0} is not in this match")]
    ParticipantNotInMatch(ParticipantId),

    #[error("Match {0} is already completed")]
    MatchAlreadyCompleted(MatchId),

    #[error("Match {0} has no result yet")]
    MatchNotCompleted(MatchId),

    /// The match fed by this one has been played, so its winner can't change
    #[error("Downstream match {0} is already completed")]
    DownstreamMatchCompleted(MatchId),

    #[error("Participant type not allowed in this tournament")]
    ParticipantTypeNotAllowed,

    #[error("Tournament format {0} is not supported")]
    UnsupportedFormat(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Optimistic concurrency check failed; the caller may reload and retry
    #[error("Concurrent modification detected, please retry")]
    Conflict,
}

impl EngineError {
    pub(crate) fn transition(action: &'static str, state: impl std::fmt::Display) -> Self {
        EngineError::InvalidStateTransition {
            action,
            state: state.to_string(),
        }
    }

    /// Get a client-safe error message that doesn't leak storage details
    pub fn client_message(&self) -> String {
        match self {
            EngineError::Database(_) | EngineError::Corrupt(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Whether the error was caused by the entity not existing
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::TournamentNotFound(_)
                | EngineError::EntryNotFound(_)
                | EngineError::MatchNotFound(_)
                | EngineError::ParticipantNotFound(_)
                | EngineError::NotRegistered(_)
        )
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
