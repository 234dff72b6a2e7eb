//! In-process store.
//!
//! All state sits behind one [`RwLock`]; a [`Changeset`] is validated and
//! applied under a single write guard, so it is atomic with respect to every
//! other call on the same store.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use super::repository::{
    Changeset, Committed, EntryRepository, MatchRepository, ParticipantLookup,
    TournamentRepository, UnitOfWork,
};
use crate::{
    errors::{EngineError, EngineResult},
    matches::{Match, MatchId},
    tournament::{
        EntryId, Participant, ParticipantId, Tournament, TournamentEntry, TournamentId,
    },
};

#[derive(Debug, Default)]
struct State {
    tournaments: HashMap<TournamentId, Tournament>,
    entries: HashMap<EntryId, TournamentEntry>,
    matches: HashMap<MatchId, Match>,
    participants: HashMap<ParticipantId, Participant>,
}

/// Anything stored with an optimistic version counter
trait Versioned {
    fn version_mut(&mut self) -> &mut i64;
    fn version(&self) -> i64;
}

macro_rules! versioned {
    ($($t:ty),*) => {
        $(impl Versioned for $t {
            fn version_mut(&mut self) -> &mut i64 {
                &mut self.version
            }

            fn version(&self) -> i64 {
                self.version
            }
        })*
    };
}

versioned!(Tournament, TournamentEntry, Match);

fn check_version<T: Versioned>(stored: Option<&T>, incoming: &T) -> EngineResult<()> {
    match stored {
        Some(s) if s.version() == incoming.version() => Ok(()),
        _ => Err(EngineError::Conflict),
    }
}

fn bumped<T: Versioned + Clone>(incoming: &T) -> T {
    let mut next = incoming.clone();
    *next.version_mut() += 1;
    next
}

fn check_new<K: std::hash::Hash + Eq, V>(map: &HashMap<K, V>, key: &K) -> EngineResult<()> {
    if map.contains_key(key) {
        return Err(EngineError::Conflict);
    }
    Ok(())
}

/// Rows are updated one statement at a time in SQL, so a second update of
/// the same row sees the version the first one wrote and fails
fn check_distinct<K: std::hash::Hash + Eq>(
    keys: impl IntoIterator<Item = K>,
) -> EngineResult<()> {
    let mut seen = HashSet::new();
    if keys.into_iter().all(|k| seen.insert(k)) {
        Ok(())
    } else {
        Err(EngineError::Conflict)
    }
}

/// Store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a participant the engine can look up
    pub async fn insert_participant(&self, participant: Participant) {
        self.state
            .write()
            .await
            .participants
            .insert(participant.id, participant);
    }
}

#[async_trait]
impl TournamentRepository for MemoryStore {
    async fn create_tournament(&self, tournament: &Tournament) -> EngineResult<()> {
        let mut state = self.state.write().await;
        check_new(&state.tournaments, &tournament.id)?;
        state.tournaments.insert(tournament.id, tournament.clone());
        Ok(())
    }

    async fn find_tournament(&self, id: TournamentId) -> EngineResult<Option<Tournament>> {
        Ok(self.state.read().await.tournaments.get(&id).cloned())
    }

    async fn list_tournaments(&self) -> EngineResult<Vec<Tournament>> {
        let mut tournaments: Vec<Tournament> =
            self.state.read().await.tournaments.values().cloned().collect();
        tournaments.sort_by_key(|t| (t.created_at, t.id));
        Ok(tournaments)
    }

    async fn update_tournament(&self, tournament: &Tournament) -> EngineResult<Tournament> {
        let mut state = self.state.write().await;
        check_version(state.tournaments.get(&tournament.id), tournament)?;
        let stored = bumped(tournament);
        state.tournaments.insert(stored.id, stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl EntryRepository for MemoryStore {
    async fn create_entry(&self, entry: &TournamentEntry) -> EngineResult<()> {
        let mut state = self.state.write().await;
        check_new(&state.entries, &entry.id)?;
        state.entries.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn list_entries(
        &self,
        tournament_id: TournamentId,
    ) -> EngineResult<Vec<TournamentEntry>> {
        let state = self.state.read().await;
        let mut entries: Vec<TournamentEntry> = state
            .entries
            .values()
            .filter(|e| e.tournament_id == tournament_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.seed);
        Ok(entries)
    }

    async fn find_entry(&self, id: EntryId) -> EngineResult<Option<TournamentEntry>> {
        Ok(self.state.read().await.entries.get(&id).cloned())
    }

    async fn find_entry_for(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> EngineResult<Option<TournamentEntry>> {
        Ok(self
            .state
            .read()
            .await
            .entries
            .values()
            .find(|e| e.tournament_id == tournament_id && e.participant_id == participant_id)
            .cloned())
    }

    async fn save_entry(&self, entry: &TournamentEntry) -> EngineResult<TournamentEntry> {
        let mut state = self.state.write().await;
        check_version(state.entries.get(&entry.id), entry)?;
        let stored = bumped(entry);
        state.entries.insert(stored.id, stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl MatchRepository for MemoryStore {
    async fn create_match(&self, m: &Match) -> EngineResult<()> {
        let mut state = self.state.write().await;
        check_new(&state.matches, &m.id)?;
        state.matches.insert(m.id, m.clone());
        Ok(())
    }

    async fn list_matches(&self, tournament_id: TournamentId) -> EngineResult<Vec<Match>> {
        let state = self.state.read().await;
        let mut matches: Vec<Match> = state
            .matches
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect();
        matches.sort_by_key(|m| (m.round_number, m.position()));
        Ok(matches)
    }

    async fn find_match(&self, id: MatchId) -> EngineResult<Option<Match>> {
        Ok(self.state.read().await.matches.get(&id).cloned())
    }

    async fn update_match(&self, m: &Match) -> EngineResult<Match> {
        let mut state = self.state.write().await;
        check_version(state.matches.get(&m.id), m)?;
        let stored = bumped(m);
        state.matches.insert(stored.id, stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl ParticipantLookup for MemoryStore {
    async fn find_participant(&self, id: ParticipantId) -> EngineResult<Option<Participant>> {
        Ok(self.state.read().await.participants.get(&id).cloned())
    }

    async fn find_participants(&self, ids: &[ParticipantId]) -> EngineResult<Vec<Participant>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.participants.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl UnitOfWork for MemoryStore {
    async fn commit(&self, changes: Changeset) -> EngineResult<Committed> {
        let mut state = self.state.write().await;

        // Validate everything before the first write
        if let Some(t) = &changes.tournament {
            check_version(state.tournaments.get(&t.id), t)?;
        }
        for e in &changes.new_entries {
            check_new(&state.entries, &e.id)?;
        }
        check_distinct(changes.updated_entries.iter().map(|e| e.id))?;
        for e in &changes.updated_entries {
            check_version(state.entries.get(&e.id), e)?;
        }
        for m in &changes.new_matches {
            check_new(&state.matches, &m.id)?;
        }
        check_distinct(changes.updated_matches.iter().map(|m| m.id))?;
        for m in &changes.updated_matches {
            check_version(state.matches.get(&m.id), m)?;
        }

        let mut committed = Committed::default();

        if let Some(t) = &changes.tournament {
            let stored = bumped(t);
            state.tournaments.insert(stored.id, stored.clone());
            committed.tournament = Some(stored);
        }

        for e in changes.new_entries {
            state.entries.insert(e.id, e.clone());
            committed.entries.push(e);
        }
        for e in &changes.updated_entries {
            let stored = bumped(e);
            state.entries.insert(stored.id, stored.clone());
            committed.entries.push(stored);
        }

        for m in changes.new_matches {
            state.matches.insert(m.id, m.clone());
            committed.matches.push(m);
        }
        for m in &changes.updated_matches {
            let stored = bumped(m);
            state.matches.insert(stored.id, stored.clone());
            committed.matches.push(stored);
        }

        Ok(committed)
    }
}
