//! Repository trait definitions for testability and dependency injection.
//!
//! Managers only talk to storage through these traits, so the same engine
//! runs against [`MemoryStore`](super::MemoryStore) in tests and
//! [`PgStore`](super::PgStore) in production.

use async_trait::async_trait;

use crate::{
    errors::EngineResult,
    matches::{Match, MatchId},
    tournament::{
        EntryId, Participant, ParticipantId, Tournament, TournamentEntry, TournamentId,
    },
};

/// Trait for tournament repository operations
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Insert a new tournament
    async fn create_tournament(&self, tournament: &Tournament) -> EngineResult<()>;

    /// Find tournament by ID
    async fn find_tournament(&self, id: TournamentId) -> EngineResult<Option<Tournament>>;

    /// All tournaments, oldest first
    async fn list_tournaments(&self) -> EngineResult<Vec<Tournament>>;

    /// Write back a tournament whose `version` matches the stored one.
    ///
    /// Returns the stored copy with the bumped version, or
    /// `EngineError::Conflict`.
    async fn update_tournament(&self, tournament: &Tournament) -> EngineResult<Tournament>;
}

/// Trait for tournament entry repository operations
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Insert a new entry
    async fn create_entry(&self, entry: &TournamentEntry) -> EngineResult<()>;

    /// Entries of a tournament ordered by seed
    async fn list_entries(&self, tournament_id: TournamentId)
    -> EngineResult<Vec<TournamentEntry>>;

    /// Find entry by ID
    async fn find_entry(&self, id: EntryId) -> EngineResult<Option<TournamentEntry>>;

    /// Find the entry a participant holds in a tournament, whatever its status
    async fn find_entry_for(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> EngineResult<Option<TournamentEntry>>;

    /// Write back an entry with an optimistic version check
    async fn save_entry(&self, entry: &TournamentEntry) -> EngineResult<TournamentEntry>;
}

/// Trait for match repository operations
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Insert a new match
    async fn create_match(&self, m: &Match) -> EngineResult<()>;

    /// Matches of a tournament ordered by round, then position
    async fn list_matches(&self, tournament_id: TournamentId) -> EngineResult<Vec<Match>>;

    /// Find match by ID
    async fn find_match(&self, id: MatchId) -> EngineResult<Option<Match>>;

    /// Write back a match with an optimistic version check
    async fn update_match(&self, m: &Match) -> EngineResult<Match>;
}

/// Read-only access to participants, which are owned elsewhere
#[async_trait]
pub trait ParticipantLookup: Send + Sync {
    async fn find_participant(&self, id: ParticipantId) -> EngineResult<Option<Participant>>;

    /// Every known participant among `ids`, in no particular order
    async fn find_participants(&self, ids: &[ParticipantId]) -> EngineResult<Vec<Participant>>;
}

/// A set of writes that must land together or not at all.
///
/// Every `updated_*` entity carries the version it was read at; the commit
/// fails with `EngineError::Conflict` if any of them moved in the meantime.
#[derive(Debug, Clone, Default)]
pub struct Changeset {
    pub tournament: Option<Tournament>,
    pub new_entries: Vec<TournamentEntry>,
    pub updated_entries: Vec<TournamentEntry>,
    pub new_matches: Vec<Match>,
    pub updated_matches: Vec<Match>,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_tournament(mut self, tournament: Tournament) -> Self {
        self.tournament = Some(tournament);
        self
    }

    pub fn insert_entry(mut self, entry: TournamentEntry) -> Self {
        self.new_entries.push(entry);
        self
    }

    pub fn update_entry(mut self, entry: TournamentEntry) -> Self {
        self.updated_entries.push(entry);
        self
    }

    pub fn insert_match(mut self, m: Match) -> Self {
        self.new_matches.push(m);
        self
    }

    pub fn update_match(mut self, m: Match) -> Self {
        self.updated_matches.push(m);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tournament.is_none()
            && self.new_entries.is_empty()
            && self.updated_entries.is_empty()
            && self.new_matches.is_empty()
            && self.updated_matches.is_empty()
    }
}

/// What a changeset looks like once stored, with bumped versions
#[derive(Debug, Clone, Default)]
pub struct Committed {
    pub tournament: Option<Tournament>,
    /// New entries first, then updated ones
    pub entries: Vec<TournamentEntry>,
    /// New matches first, then updated ones
    pub matches: Vec<Match>,
}

impl Committed {
    pub fn find_match(&self, id: MatchId) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == id)
    }
}

/// Atomic application of a [`Changeset`]
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    async fn commit(&self, changes: Changeset) -> EngineResult<Committed>;
}

/// Everything the engine needs from storage
pub trait Store:
    TournamentRepository + EntryRepository + MatchRepository + ParticipantLookup + UnitOfWork
{
}

impl<T> Store for T where
    T: TournamentRepository + EntryRepository + MatchRepository + ParticipantLookup + UnitOfWork
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::NewTournament;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_changeset_builder() {
        let tournament = Tournament::create(
            Uuid::new_v4(),
            NewTournament::single_elimination("Cup", "chess"),
            Utc::now(),
        )
        .unwrap();

        let changes = Changeset::new();
        assert!(changes.is_empty());

        let changes = changes.update_tournament(tournament.clone());
        assert!(!changes.is_empty());
        assert_eq!(changes.tournament, Some(tournament));
        assert!(changes.new_matches.is_empty());
    }
}
