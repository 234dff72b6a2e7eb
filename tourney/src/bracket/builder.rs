//! Bracket construction.
//!
//! The whole tree is materialized up front: round 1 holds the seeded pairs,
//! later rounds hold placeholder slots pointing back at the matches that
//! feed them. Nothing is persisted here; the caller commits the result as
//! one changeset.

use chrono::{DateTime, Utc};

use super::seeding::{pair_entries, round_count};
use crate::{
    errors::EngineResult,
    matches::{Match, Slot},
    ports::IdGenerator,
    tournament::{TournamentEntry, TournamentId},
};

/// Build every match of a single-elimination bracket.
///
/// `entries` must be the confirmed entries in ascending seed order. Returns
/// the matches ordered by round, then position.
pub fn build_bracket(
    tournament_id: TournamentId,
    entries: &[TournamentEntry],
    ids: &dyn IdGenerator,
    now: DateTime<Utc>,
) -> EngineResult<Vec<Match>> {
    let pairs = pair_entries(entries)?;
    let rounds = round_count(entries.len());

    let mut matches: Vec<Match> = Vec::with_capacity(entries.len() - 1);
    let mut previous: Vec<usize> = Vec::with_capacity(pairs.len());

    for (index, (a, b)) in pairs.iter().enumerate() {
        let m = Match::new(
            ids.generate(),
            tournament_id,
            1,
            index as u32 + 1,
            [
                Slot::Participant(a.participant_id),
                Slot::Participant(b.participant_id),
            ],
            now,
        )?;
        previous.push(matches.len());
        matches.push(m);
    }

    for round in 2..=rounds {
        let mut current = Vec::with_capacity(previous.len() / 2);

        for (index, feeders) in previous.chunks(2).enumerate() {
            let (ia, ib) = (feeders[0], feeders[1]);
            let (a, b) = (matches[ia].id, matches[ib].id);

            let mut m = Match::new(
                ids.generate(),
                tournament_id,
                round,
                index as u32 + 1,
                [Slot::Pending(a), Slot::Pending(b)],
                now,
            )?;
            m.links.from = Some((a, b));

            matches[ia].links.next_match_id = Some(m.id);
            matches[ib].links.next_match_id = Some(m.id);

            current.push(matches.len());
            matches.push(m);
        }

        previous = current;
    }

    log::debug!(
        "Built bracket for tournament {}: {} matches over {} rounds",
        tournament_id,
        matches.len(),
        rounds
    );

    Ok(matches)
}
