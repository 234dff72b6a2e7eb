//! Bracket generation and the bracket read model.

use std::collections::HashMap;

use super::{
    builder::build_bracket,
    view::{BracketView, assemble, participant_ids},
};
use crate::{
    context::EngineContext,
    db::Changeset,
    errors::{EngineError, EngineResult},
    matches::Match,
    tournament::{EntryStatus, TournamentFormat, TournamentId, manager::load_tournament},
};

/// Bracket manager
#[derive(Clone)]
pub struct BracketManager {
    ctx: EngineContext,
}

impl BracketManager {
    /// Create a new bracket manager
    pub fn new(ctx: EngineContext) -> Self {
        Self { ctx }
    }

    /// Seed the confirmed entries, materialize every round and start the
    /// tournament, all in one commit.
    ///
    /// Returns the matches ordered by round, then position.
    pub async fn generate_bracket(&self, tournament_id: TournamentId) -> EngineResult<Vec<Match>> {
        let store = self.ctx.store.as_ref();
        let mut tournament = load_tournament(store, tournament_id).await?;

        if tournament.format != TournamentFormat::SingleElimination {
            return Err(EngineError::UnsupportedFormat(tournament.format.to_string()));
        }
        if !tournament.can_generate_bracket() {
            return Err(EngineError::transition("generate a bracket", tournament.status()));
        }

        let mut confirmed: Vec<_> = store
            .list_entries(tournament_id)
            .await?
            .into_iter()
            .filter(|e| e.status() == EntryStatus::Confirmed)
            .collect();
        confirmed.sort_by_key(|e| e.seed);

        let now = self.ctx.clock.now();
        let matches = build_bracket(tournament_id, &confirmed, self.ctx.ids.as_ref(), now)?;
        tournament.start(now)?;

        let changes = matches
            .into_iter()
            .fold(Changeset::new().update_tournament(tournament), |changes, m| {
                changes.insert_match(m)
            });

        let committed = match store.commit(changes).await {
            Ok(committed) => committed,
            Err(EngineError::Conflict) => {
                log::warn!(
                    "Bracket generation for tournament {} lost a concurrent update",
                    tournament_id
                );
                return Err(EngineError::Conflict);
            }
            Err(e) => return Err(e),
        };

        log::info!(
            "Generated bracket for tournament {}: {} entries, {} matches; tournament started",
            tournament_id,
            confirmed.len(),
            committed.matches.len()
        );

        Ok(committed.matches)
    }

    /// Current bracket, round by round
    pub async fn view_bracket(&self, tournament_id: TournamentId) -> EngineResult<BracketView> {
        let store = self.ctx.store.as_ref();
        let tournament = load_tournament(store, tournament_id).await?;
        let matches = store.list_matches(tournament.id).await?;

        let participants: HashMap<_, _> = store
            .find_participants(&participant_ids(&matches))
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(assemble(tournament.id, matches, &participants))
    }
}
