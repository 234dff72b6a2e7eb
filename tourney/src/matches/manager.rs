//! Match manager: scoring, editing and annulling results.
//!
//! Each operation loads the tournament's whole bracket into an [`Arena`],
//! applies the change plus any advancement in memory, and writes everything
//! back in one version-checked commit.

use serde::Serialize;

use super::models::{Match, MatchId, ScoreInput};
use crate::{
    bracket::{
        Arena,
        advance::{AdvancePlan, Advancement, advance, repropagate},
    },
    context::EngineContext,
    db::Changeset,
    errors::{EngineError, EngineResult},
    notify::{WebhookPayload, dispatch},
    tournament::{Tournament, TournamentId, manager::load_tournament},
};

/// Everything a result change wrote
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultUpdate {
    /// The match that was scored, edited or annulled
    #[serde(rename = "match")]
    pub scored: Match,
    pub advancement: Advancement,
    /// Other matches written in the same commit
    pub affected: Vec<Match>,
    /// Set when this result completed the tournament
    pub completed_tournament: Option<Tournament>,
}

/// Match manager
#[derive(Clone)]
pub struct MatchManager {
    ctx: EngineContext,
}

impl MatchManager {
    /// Create a new match manager
    pub fn new(ctx: EngineContext) -> Self {
        Self { ctx }
    }

    /// Get match by ID
    pub async fn get_match(&self, id: MatchId) -> EngineResult<Match> {
        self.ctx
            .store
            .find_match(id)
            .await?
            .ok_or(EngineError::MatchNotFound(id))
    }

    /// Matches of a tournament ordered by round, then position
    pub async fn list_matches(&self, tournament_id: TournamentId) -> EngineResult<Vec<Match>> {
        let store = self.ctx.store.as_ref();
        load_tournament(store, tournament_id).await?;
        store.list_matches(tournament_id).await
    }

    /// Score an open match and advance its winner.
    ///
    /// Scoring the final completes the tournament and, if it has a webhook
    /// URL, posts the result there in the background.
    pub async fn record_result(
        &self,
        match_id: MatchId,
        scores: [ScoreInput; 2],
    ) -> EngineResult<ResultUpdate> {
        let m = self.get_match(match_id).await?;
        if m.is_completed() {
            return Err(EngineError::MatchAlreadyCompleted(match_id));
        }

        let (tournament, mut arena) = self.load_bracket(&m, "record a result").await?;
        let now = self.ctx.clock.now();

        arena
            .get_mut(match_id)
            .ok_or(EngineError::MatchNotFound(match_id))?
            .record(&scores, now)?;
        let plan = advance(&mut arena, match_id, self.ctx.ids.as_ref(), now)?;

        log::info!(
            "Recorded result for match {} (round {}): {:?}",
            match_id,
            m.round_number,
            plan.advancement
        );

        self.apply(tournament, arena, match_id, plan).await
    }

    /// Replace the scores of a completed match.
    ///
    /// If the winner changes, the old winner is pulled back out of the next
    /// round and the new one advanced, unless the next round match has
    /// already been played.
    pub async fn edit_result(
        &self,
        match_id: MatchId,
        scores: [ScoreInput; 2],
    ) -> EngineResult<ResultUpdate> {
        let m = self.get_match(match_id).await?;
        if !m.is_completed() {
            return Err(EngineError::MatchNotCompleted(match_id));
        }

        let (tournament, mut arena) = self.load_bracket(&m, "edit a result").await?;
        let now = self.ctx.clock.now();

        let scored = arena
            .get_mut(match_id)
            .ok_or(EngineError::MatchNotFound(match_id))?;
        let previous = scored.winner();
        scored.edit(&scores)?;
        let plan = repropagate(&mut arena, match_id, previous, self.ctx.ids.as_ref(), now)?;

        log::info!("Edited result of match {}: {:?}", match_id, plan.advancement);

        self.apply(tournament, arena, match_id, plan).await
    }

    /// Return a completed match to open, retracting its winner from the next
    /// round.
    pub async fn annul_result(&self, match_id: MatchId) -> EngineResult<ResultUpdate> {
        let m = self.get_match(match_id).await?;
        if !m.is_completed() {
            return Err(EngineError::MatchNotCompleted(match_id));
        }

        let (tournament, mut arena) = self.load_bracket(&m, "annul a result").await?;
        let now = self.ctx.clock.now();

        let scored = arena
            .get_mut(match_id)
            .ok_or(EngineError::MatchNotFound(match_id))?;
        let previous = scored.winner();
        scored.annul()?;
        let plan = repropagate(&mut arena, match_id, previous, self.ctx.ids.as_ref(), now)?;

        log::info!("Annulled result of match {}", match_id);

        self.apply(tournament, arena, match_id, plan).await
    }

    /// Load the owning tournament (which must be started) and its bracket
    async fn load_bracket(
        &self,
        m: &Match,
        action: &'static str,
    ) -> EngineResult<(Tournament, Arena)> {
        let store = self.ctx.store.as_ref();
        let tournament = load_tournament(store, m.tournament_id).await?;
        if !tournament.can_start_matches() {
            return Err(EngineError::transition(action, tournament.status()));
        }

        let arena = Arena::new(store.list_matches(tournament.id).await?);
        Ok((tournament, arena))
    }

    /// Commit the changed match, everything the plan touched and, for a
    /// decided final, the tournament's completion
    async fn apply(
        &self,
        mut tournament: Tournament,
        arena: Arena,
        match_id: MatchId,
        plan: AdvancePlan,
    ) -> EngineResult<ResultUpdate> {
        let get = |id: MatchId| arena.get(id).cloned().ok_or(EngineError::MatchNotFound(id));

        let mut changes = Changeset::new().update_match(get(match_id)?);
        for id in plan.touched.iter().filter(|id| **id != match_id) {
            changes = changes.update_match(get(*id)?);
        }
        for id in &plan.created {
            changes = changes.insert_match(get(*id)?);
        }

        let mut webhook = None;
        if let Advancement::Champion { winner } = plan.advancement {
            let now = self.ctx.clock.now();
            tournament.complete(now)?;
            if let Some(url) = &tournament.webhook_url {
                webhook = Some((
                    url.clone(),
                    WebhookPayload {
                        tournament_id: tournament.id,
                        winner_id: winner,
                        completed_at: now,
                    },
                ));
            }
            changes = changes.update_tournament(tournament);
        }

        let committed = match self.ctx.store.commit(changes).await {
            Ok(committed) => committed,
            Err(EngineError::Conflict) => {
                log::warn!("Match {} lost a concurrent update", match_id);
                return Err(EngineError::Conflict);
            }
            Err(e) => return Err(e),
        };

        if let Some(t) = &committed.tournament {
            log::info!("Tournament {} completed", t.id);
        }
        if let Some((url, payload)) = webhook {
            dispatch(self.ctx.webhooks.clone(), url, payload);
        }

        let scored = committed
            .find_match(match_id)
            .cloned()
            .ok_or(EngineError::MatchNotFound(match_id))?;
        let affected = committed
            .matches
            .into_iter()
            .filter(|m| m.id != match_id)
            .collect();

        Ok(ResultUpdate {
            scored,
            advancement: plan.advancement,
            affected,
            completed_tournament: committed.tournament,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bracket::BracketManager,
        bracket::build_bracket,
        db::{MatchRepository, MemoryStore, UnitOfWork},
        matches::Slot,
        tournament::{
            NewTournament, Participant, ParticipantId, ParticipantType, TournamentManager,
            TournamentStatus,
        },
    };
    use chrono::Utc;
    use std::sync::Arc;
    use uuid::Uuid;

    struct Fixture {
        tournaments: TournamentManager,
        matches: MatchManager,
        store: Arc<MemoryStore>,
        tournament_id: TournamentId,
        /// Participants by seed, index 0 is seed 1
        seeds: Vec<ParticipantId>,
    }

    async fn started(players: u32) -> Fixture {
        let f = registered(players).await;
        BracketManager::new(f.matches.ctx.clone())
            .generate_bracket(f.tournament_id)
            .await
            .unwrap();
        f
    }

    /// Started tournament whose stored bracket has only its first round,
    /// with no links to a next round
    async fn started_without_later_rounds(players: u32) -> Fixture {
        let f = registered(players).await;
        let ctx = &f.matches.ctx;
        let entries = f.tournaments.list_entries(f.tournament_id).await.unwrap();
        let mut first_round = build_bracket(f.tournament_id, &entries, ctx.ids.as_ref(), Utc::now())
            .unwrap();
        first_round.retain(|m| m.round_number == 1);
        for m in &mut first_round {
            m.links.next_match_id = None;
        }

        let mut tournament = f.tournaments.get_tournament(f.tournament_id).await.unwrap();
        tournament.start(Utc::now()).unwrap();
        let changes = first_round
            .into_iter()
            .fold(Changeset::new().update_tournament(tournament), |c, m| c.insert_match(m));
        f.store.commit(changes).await.unwrap();
        f
    }

    async fn registered(players: u32) -> Fixture {
        let (ctx, store) = EngineContext::in_memory();
        let tournaments = TournamentManager::new(ctx.clone());

        let t = tournaments
            .create_tournament(NewTournament::single_elimination("Cup", "chess").published())
            .await
            .unwrap();
        let mut seeds = Vec::new();
        for n in 1..=players {
            let id = Uuid::new_v4();
            store
                .insert_participant(Participant {
                    id,
                    participant_type: ParticipantType::Player,
                    display_name: format!("Seed {n}"),
                })
                .await;
            tournaments.register_entry(t.id, id, None).await.unwrap();
            seeds.push(id);
        }

        Fixture {
            tournaments,
            matches: MatchManager::new(ctx),
            store,
            tournament_id: t.id,
            seeds,
        }
    }

    impl Fixture {
        async fn at(&self, round: u32, position: u32) -> Match {
            self.store
                .list_matches(self.tournament_id)
                .await
                .unwrap()
                .into_iter()
                .find(|m| m.round_number == round && m.position() == position)
                .unwrap()
        }

        fn seed(&self, n: usize) -> ParticipantId {
            self.seeds[n - 1]
        }

        async fn play(&self, round: u32, position: u32, winner: usize, loser: usize) -> ResultUpdate {
            let m = self.at(round, position).await;
            self.matches
                .record_result(
                    m.id,
                    [
                        ScoreInput::new(self.seed(winner), 3),
                        ScoreInput::new(self.seed(loser), 1),
                    ],
                )
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn test_record_waits_for_sibling() {
        let f = started(4).await;
        let update = f.play(1, 1, 1, 4).await;

        assert!(update.scored.is_completed());
        assert!(matches!(
            update.advancement,
            Advancement::AwaitingPartner { parent: Some(_) }
        ));
        // Parent only version-touched
        assert_eq!(update.affected.len(), 1);
        assert!(update.affected[0].participants.iter().all(|p| p.slot.is_pending()));
    }

    #[tokio::test]
    async fn test_full_bracket_completes_tournament() {
        let f = started(4).await;
        f.play(1, 1, 1, 4).await;
        let update = f.play(1, 2, 2, 3).await;

        let final_match = f.at(2, 1).await;
        assert!(matches!(update.advancement, Advancement::Seated { parent } if parent == final_match.id));
        assert_eq!(final_match.participants[0].slot, Slot::Participant(f.seed(1)));
        assert_eq!(final_match.participants[1].slot, Slot::Participant(f.seed(2)));

        let update = f.play(2, 1, 2, 1).await;
        assert_eq!(update.advancement, Advancement::Champion { winner: f.seed(2) });
        assert_eq!(
            update.completed_tournament.unwrap().status(),
            TournamentStatus::Completed
        );

        let t = f.tournaments.get_tournament(f.tournament_id).await.unwrap();
        assert_eq!(t.status(), TournamentStatus::Completed);
    }

    #[tokio::test]
    async fn test_missing_next_round_match_is_created_on_commit() {
        let f = started_without_later_rounds(4).await;
        let first = f.play(1, 1, 1, 4).await;
        assert_eq!(first.advancement, Advancement::AwaitingPartner { parent: None });

        let second = f.play(1, 2, 2, 3).await;
        let Advancement::Seated { parent } = second.advancement else {
            panic!("expected both winners seated, got {:?}", second.advancement);
        };

        let created = f.at(2, 1).await;
        assert_eq!(created.id, parent);
        assert_eq!(created.participants[0].slot, Slot::Participant(f.seed(1)));
        assert_eq!(created.participants[1].slot, Slot::Participant(f.seed(2)));

        // Both feeders now link forward, each written exactly once
        let upper = f.at(1, 1).await;
        let lower = f.at(1, 2).await;
        assert_eq!(upper.links.next_match_id, Some(parent));
        assert_eq!(lower.links.next_match_id, Some(parent));
        assert_eq!(lower.version, second.scored.version);
        assert_eq!(
            second.affected.iter().filter(|m| m.id == lower.id).count(),
            0
        );

        let update = f.play(2, 1, 1, 2).await;
        assert_eq!(update.advancement, Advancement::Champion { winner: f.seed(1) });
    }

    #[tokio::test]
    async fn test_record_twice_rejected() {
        let f = started(2).await;
        let m = f.at(1, 1).await;
        f.play(1, 1, 1, 2).await;

        let err = f
            .matches
            .record_result(
                m.id,
                [ScoreInput::new(f.seed(1), 0), ScoreInput::new(f.seed(2), 9)],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::MatchAlreadyCompleted(_)));
    }

    #[tokio::test]
    async fn test_placeholder_match_cannot_be_scored() {
        let f = started(4).await;
        let final_match = f.at(2, 1).await;

        let err = f
            .matches
            .record_result(
                final_match.id,
                [ScoreInput::new(f.seed(1), 1), ScoreInput::new(f.seed(2), 0)],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ParticipantNotInMatch(_)));
    }

    #[tokio::test]
    async fn test_edit_requires_completed_match() {
        let f = started(2).await;
        let m = f.at(1, 1).await;
        let err = f
            .matches
            .edit_result(
                m.id,
                [ScoreInput::new(f.seed(1), 1), ScoreInput::new(f.seed(2), 0)],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::MatchNotCompleted(_)));
    }

    #[tokio::test]
    async fn test_completed_tournament_is_frozen() {
        let f = started(2).await;
        let m = f.at(1, 1).await;
        f.play(1, 1, 1, 2).await;

        let err = f.matches.annul_result(m.id).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidStateTransition { .. }));
    }

    #[tokio::test]
    async fn test_list_matches_ordered() {
        let f = started(8).await;
        let coords: Vec<(u32, u32)> = f
            .matches
            .list_matches(f.tournament_id)
            .await
            .unwrap()
            .iter()
            .map(|m| (m.round_number, m.position()))
            .collect();
        assert_eq!(
            coords,
            vec![(1, 1), (1, 2), (1, 3), (1, 4), (2, 1), (2, 2), (3, 1)]
        );
    }

    #[tokio::test]
    async fn test_unknown_match() {
        let f = started(2).await;
        assert!(matches!(
            f.matches.get_match(Uuid::new_v4()).await,
            Err(EngineError::MatchNotFound(_))
        ));
    }
}
