//! Tournament manager: lifecycle and registration.

use super::{
    entry::{EntryId, EntryStatus, TournamentEntry, next_seed},
    models::{NewTournament, ParticipantId, Tournament, TournamentId, TournamentStatus},
};
use crate::{
    context::EngineContext,
    db::{Changeset, Store},
    errors::{EngineError, EngineResult},
};

/// Load a tournament or fail with `TournamentNotFound`
pub(crate) async fn load_tournament(store: &dyn Store, id: TournamentId) -> EngineResult<Tournament> {
    store
        .find_tournament(id)
        .await?
        .ok_or(EngineError::TournamentNotFound(id))
}

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    ctx: EngineContext,
}

impl TournamentManager {
    /// Create a new tournament manager
    pub fn new(ctx: EngineContext) -> Self {
        Self { ctx }
    }

    /// Create a new tournament
    pub async fn create_tournament(&self, input: NewTournament) -> EngineResult<Tournament> {
        let tournament = Tournament::create(self.ctx.ids.generate(), input, self.ctx.clock.now())?;
        self.ctx.store.create_tournament(&tournament).await?;

        log::info!(
            "Created tournament {} '{}' ({})",
            tournament.id,
            tournament.name,
            tournament.status()
        );

        Ok(tournament)
    }

    /// Get tournament by ID
    pub async fn get_tournament(&self, id: TournamentId) -> EngineResult<Tournament> {
        load_tournament(self.ctx.store.as_ref(), id).await
    }

    /// All tournaments, oldest first
    pub async fn list_tournaments(&self) -> EngineResult<Vec<Tournament>> {
        self.ctx.store.list_tournaments().await
    }

    /// Open a draft tournament for registration
    pub async fn publish_tournament(&self, id: TournamentId) -> EngineResult<Tournament> {
        let mut tournament = self.get_tournament(id).await?;
        tournament.publish(self.ctx.clock.now())?;
        let tournament = self.ctx.store.update_tournament(&tournament).await?;

        log::info!("Published tournament {}", id);
        Ok(tournament)
    }

    /// Call off a tournament that has not completed
    pub async fn cancel_tournament(&self, id: TournamentId) -> EngineResult<Tournament> {
        let mut tournament = self.get_tournament(id).await?;
        let previous = tournament.status();
        tournament.cancel(self.ctx.clock.now())?;
        let tournament = self.ctx.store.update_tournament(&tournament).await?;

        log::info!("Cancelled tournament {} (was {})", id, previous);
        Ok(tournament)
    }

    /// Register a participant.
    ///
    /// A withdrawn participant gets their old entry back, with the same id and
    /// seed. New entries are seeded after every existing one. `status` defaults
    /// to CONFIRMED.
    ///
    /// The tournament row is version-checked in the same commit, so concurrent
    /// registrations can't both take the last seat.
    pub async fn register_entry(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
        status: Option<EntryStatus>,
    ) -> EngineResult<TournamentEntry> {
        let store = self.ctx.store.as_ref();
        let tournament = load_tournament(store, tournament_id).await?;
        if !tournament.can_enroll() {
            return Err(EngineError::transition("register", tournament.status()));
        }

        let participant = store
            .find_participant(participant_id)
            .await?
            .ok_or(EngineError::ParticipantNotFound(participant_id))?;
        if !tournament.accepts(participant.participant_type) {
            return Err(EngineError::ParticipantTypeNotAllowed);
        }

        let status = status.unwrap_or(EntryStatus::Confirmed);
        let entries = store.list_entries(tournament_id).await?;
        let existing = entries
            .iter()
            .find(|e| e.participant_id == participant_id)
            .cloned();

        if let Some(existing) = &existing {
            match existing.status() {
                EntryStatus::Pending | EntryStatus::Confirmed => {
                    return Err(EngineError::DuplicateRegistration(participant_id));
                }
                EntryStatus::Cancelled => {
                    return Err(EngineError::transition("re-register", EntryStatus::Cancelled));
                }
                EntryStatus::Withdrawn => {}
            }
        }

        if let Some(max) = tournament.max_participants {
            let seated = entries.iter().filter(|e| e.status().occupies_seat()).count();
            if seated >= max as usize {
                return Err(EngineError::TournamentFull { max });
            }
        }

        let changes = Changeset::new().update_tournament(tournament);
        let changes = match existing {
            Some(mut entry) => {
                entry.reactivate(status)?;
                log::info!(
                    "Participant {} re-registered in tournament {} (seed {})",
                    participant_id,
                    tournament_id,
                    entry.seed
                );
                changes.update_entry(entry)
            }
            None => {
                let entry = TournamentEntry::new(
                    self.ctx.ids.generate(),
                    tournament_id,
                    participant_id,
                    next_seed(&entries),
                    status,
                    self.ctx.clock.now(),
                )?;
                log::info!(
                    "Participant {} registered in tournament {} (seed {})",
                    participant_id,
                    tournament_id,
                    entry.seed
                );
                changes.insert_entry(entry)
            }
        };

        self.commit_entry(changes).await
    }

    /// Withdraw a participant while registration is open
    pub async fn withdraw_entry(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
    ) -> EngineResult<TournamentEntry> {
        let store = self.ctx.store.as_ref();
        let tournament = load_tournament(store, tournament_id).await?;
        if !tournament.can_withdraw() {
            return Err(EngineError::transition("withdraw", tournament.status()));
        }

        let mut entry = store
            .find_entry_for(tournament_id, participant_id)
            .await?
            .ok_or(EngineError::NotRegistered(participant_id))?;
        entry.withdraw()?;

        log::info!(
            "Participant {} withdrew from tournament {}",
            participant_id,
            tournament_id
        );

        self.commit_entry(Changeset::new().update_tournament(tournament).update_entry(entry))
            .await
    }

    /// Move a pending entry to confirmed
    pub async fn confirm_entry(&self, entry_id: EntryId) -> EngineResult<TournamentEntry> {
        let (tournament, mut entry) = self.load_entry(entry_id).await?;
        if !tournament.can_enroll() {
            return Err(EngineError::transition("confirm entry", tournament.status()));
        }
        entry.confirm()?;

        self.commit_entry(Changeset::new().update_tournament(tournament).update_entry(entry))
            .await
    }

    /// Organizer cancellation of an entry, before the bracket exists
    pub async fn cancel_entry(&self, entry_id: EntryId) -> EngineResult<TournamentEntry> {
        let (tournament, mut entry) = self.load_entry(entry_id).await?;
        if !matches!(
            tournament.status(),
            TournamentStatus::Draft | TournamentStatus::Published
        ) {
            return Err(EngineError::transition("cancel entry", tournament.status()));
        }
        entry.cancel()?;

        log::info!(
            "Entry {} of participant {} cancelled",
            entry.id,
            entry.participant_id
        );

        self.commit_entry(Changeset::new().update_tournament(tournament).update_entry(entry))
            .await
    }

    /// Entries of a tournament ordered by seed
    pub async fn list_entries(
        &self,
        tournament_id: TournamentId,
    ) -> EngineResult<Vec<TournamentEntry>> {
        let store = self.ctx.store.as_ref();
        load_tournament(store, tournament_id).await?;
        store.list_entries(tournament_id).await
    }

    async fn load_entry(&self, entry_id: EntryId) -> EngineResult<(Tournament, TournamentEntry)> {
        let store = self.ctx.store.as_ref();
        let entry = store
            .find_entry(entry_id)
            .await?
            .ok_or(EngineError::EntryNotFound(entry_id))?;
        let tournament = load_tournament(store, entry.tournament_id).await?;
        Ok((tournament, entry))
    }

    async fn commit_entry(&self, changes: Changeset) -> EngineResult<TournamentEntry> {
        let committed = self.ctx.store.commit(changes).await?;
        committed
            .entries
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::Corrupt("commit returned no entry".to_string()))
    }
}
