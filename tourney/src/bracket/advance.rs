//! Winner advancement through the bracket tree.
//!
//! These functions only rearrange matches inside an [`Arena`]; they report
//! which matches they touched so the caller can commit them together with
//! the scored match.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{arena::Arena, seeding::next_round_position};
use crate::{
    errors::{EngineError, EngineResult},
    matches::{Match, MatchId, Slot},
    ports::IdGenerator,
    tournament::ParticipantId,
};

/// What happened after a match was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Advancement {
    /// Draw or annulled result, nobody moves on
    NoWinner,
    /// An edit kept the same winner
    Unchanged,
    /// The sibling match is still open (or drawn); the parent waits
    AwaitingPartner { parent: Option<MatchId> },
    /// Both winners are now seated in the parent match
    Seated { parent: MatchId },
    /// The final was decided
    Champion { winner: ParticipantId },
}

/// Result of an advancement step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvancePlan {
    pub advancement: Advancement,
    /// Existing matches that must be written back (possibly unchanged, so
    /// their version is checked and bumped)
    pub touched: Vec<MatchId>,
    /// Matches that did not exist before
    pub created: Vec<MatchId>,
}

impl AdvancePlan {
    fn new(advancement: Advancement) -> Self {
        Self {
            advancement,
            touched: Vec::new(),
            created: Vec::new(),
        }
    }

    fn touch(&mut self, id: MatchId) {
        if !self.touched.contains(&id) {
            self.touched.push(id);
        }
    }

    fn merge(&mut self, other: AdvancePlan) {
        for id in other.touched {
            self.touch(id);
        }
        self.created.extend(other.created);
        self.advancement = other.advancement;
    }
}

/// Side of `parent` that `child`'s winner occupies
fn side_in_parent(parent: &Match, child: &Match) -> usize {
    match parent.links.from {
        Some((_, b)) if b == child.id => 1,
        Some(_) => 0,
        None if child.position() % 2 == 0 => 1,
        None => 0,
    }
}

/// Move the winner of `match_id` forward.
///
/// If the sibling match is also decided, both winners are seated in the
/// parent (created on the fly when the bracket lacks it). If there is no
/// sibling and the match is in the last round, it was the final.
pub fn advance(
    arena: &mut Arena,
    match_id: MatchId,
    ids: &dyn IdGenerator,
    now: DateTime<Utc>,
) -> EngineResult<AdvancePlan> {
    let m = arena
        .get(match_id)
        .ok_or(EngineError::MatchNotFound(match_id))?;

    let Some(winner) = m.winner() else {
        return Ok(AdvancePlan::new(Advancement::NoWinner));
    };

    let parent_id = arena.parent_of(m).map(|p| p.id);

    let Some(partner) = arena.partner_of(m) else {
        if m.round_number == arena.max_round() && parent_id.is_none() {
            return Ok(AdvancePlan::new(Advancement::Champion { winner }));
        }
        log::warn!(
            "Match {} (round {}, position {}) has no partner; not advancing",
            m.id,
            m.round_number,
            m.position()
        );
        return Ok(AdvancePlan::new(Advancement::AwaitingPartner { parent: parent_id }));
    };

    let partner_winner = if partner.is_completed() {
        partner.winner()
    } else {
        None
    };

    let Some(partner_winner) = partner_winner else {
        let mut plan = AdvancePlan::new(Advancement::AwaitingPartner { parent: parent_id });
        if let Some(parent) = parent_id {
            plan.touch(parent);
        }
        return Ok(plan);
    };

    let (first, second) = if m.position() < partner.position() {
        ((m.id, winner), (partner.id, partner_winner))
    } else {
        ((partner.id, partner_winner), (m.id, winner))
    };
    let slots = [Slot::Participant(first.1), Slot::Participant(second.1)];

    match parent_id {
        Some(parent_id) => {
            let parent = arena
                .get_mut(parent_id)
                .ok_or(EngineError::MatchNotFound(parent_id))?;
            if parent.is_completed() {
                return Err(EngineError::DownstreamMatchCompleted(parent_id));
            }
            parent.seat(slots);

            log::debug!("Seated winners of {} and {} in {}", first.0, second.0, parent_id);

            let mut plan = AdvancePlan::new(Advancement::Seated { parent: parent_id });
            plan.touch(parent_id);
            Ok(plan)
        }
        None => {
            let (round, position, tournament_id) =
                (m.round_number + 1, next_round_position(m.position()), m.tournament_id);

            let mut parent = Match::new(ids.generate(), tournament_id, round, position, slots, now)?;
            parent.links.from = Some((first.0, second.0));
            let parent_id = parent.id;
            arena.insert(parent);

            for child in [first.0, second.0] {
                if let Some(c) = arena.get_mut(child) {
                    c.links.next_match_id = Some(parent_id);
                }
            }

            log::debug!(
                "Created round {} match {} for winners of {} and {}",
                round,
                parent_id,
                first.0,
                second.0
            );

            // The scored match is written by the caller; only its partner
            // gains a link here
            let partner_id = if first.0 == match_id { second.0 } else { first.0 };
            let mut plan = AdvancePlan::new(Advancement::Seated { parent: parent_id });
            plan.touch(partner_id);
            plan.created.push(parent_id);
            Ok(plan)
        }
    }
}

/// Bring the parent match in line after a decided match changed its result.
///
/// `previous_winner` is who won before the edit or annulment. A winner that
/// was already seated downstream is replaced by the placeholder, and the new
/// winner (if any) is advanced as usual. Fails if the parent has already been
/// played, since its result would no longer follow from the bracket.
pub fn repropagate(
    arena: &mut Arena,
    match_id: MatchId,
    previous_winner: Option<ParticipantId>,
    ids: &dyn IdGenerator,
    now: DateTime<Utc>,
) -> EngineResult<AdvancePlan> {
    let m = arena
        .get(match_id)
        .ok_or(EngineError::MatchNotFound(match_id))?;
    let new_winner = m.winner();

    if new_winner == previous_winner {
        return Ok(AdvancePlan::new(Advancement::Unchanged));
    }

    let mut plan = AdvancePlan::new(Advancement::NoWinner);

    if let Some(parent) = arena.parent_of(m) {
        if parent.is_completed() {
            return Err(EngineError::DownstreamMatchCompleted(parent.id));
        }

        let side = side_in_parent(parent, m);
        let parent_id = parent.id;
        let seated_previous = previous_winner
            .is_some_and(|prev| parent.participants[side].slot == Slot::Participant(prev));

        if seated_previous {
            if let Some(parent) = arena.get_mut(parent_id) {
                parent.set_slot(side, Slot::Pending(match_id));
            }
            log::debug!(
                "Retracted previous winner of {} from {}",
                match_id,
                parent_id
            );
        }
        plan.touch(parent_id);
    }

    if new_winner.is_some() {
        plan.merge(advance(arena, match_id, ids, now)?);
    }

    Ok(plan)
}
