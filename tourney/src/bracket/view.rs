//! Round-by-round projection of a bracket for display.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::arena::Arena;
use crate::{
    matches::{Match, MatchId, MatchParticipant},
    tournament::{Participant, ParticipantId, TournamentId},
};

/// A seated participant as shown in the bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    pub id: ParticipantId,
    pub display_name: String,
    pub score: Option<i64>,
}

/// Where a related match sits in the bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub round: u32,
    pub position: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketMatchView {
    pub id: MatchId,
    pub round_number: u32,
    pub position: u32,
    pub next_match_id: Option<MatchId>,
    /// `None` while the slot is a placeholder or the participant is unknown
    pub participant1: Option<ParticipantView>,
    pub participant2: Option<ParticipantView>,
    pub winner_id: Option<ParticipantId>,
    pub completed: bool,
    pub next: Option<Coordinates>,
    pub from: Option<[Coordinates; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketRoundView {
    pub round_number: u32,
    pub matches: Vec<BracketMatchView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketView {
    pub tournament_id: TournamentId,
    pub rounds: Vec<BracketRoundView>,
}

/// Real participant ids referenced by any slot
pub fn participant_ids(matches: &[Match]) -> Vec<ParticipantId> {
    let mut ids: Vec<ParticipantId> = matches
        .iter()
        .flat_map(|m| m.participants.iter())
        .filter_map(|p| p.slot.participant())
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

fn resolve(
    side: &MatchParticipant,
    participants: &HashMap<ParticipantId, Participant>,
) -> Option<ParticipantView> {
    let participant = participants.get(&side.slot.participant()?)?;
    Some(ParticipantView {
        id: participant.id,
        display_name: participant.display_name.clone(),
        score: side.score,
    })
}

fn coordinates(arena: &Arena, id: MatchId) -> Option<Coordinates> {
    arena.get(id).map(|m| Coordinates {
        round: m.round_number,
        position: m.position(),
    })
}

/// Build the view from a tournament's matches and the participants they
/// reference. Pure; missing participants simply show as unresolved.
pub fn assemble(
    tournament_id: TournamentId,
    matches: Vec<Match>,
    participants: &HashMap<ParticipantId, Participant>,
) -> BracketView {
    let arena = Arena::new(matches);
    let mut rounds: BTreeMap<u32, Vec<&Match>> = BTreeMap::new();
    for m in arena.iter() {
        rounds.entry(m.round_number).or_default().push(m);
    }

    let rounds = rounds
        .into_iter()
        .map(|(round_number, mut group)| {
            group.sort_by_key(|m| m.position());
            BracketRoundView {
                round_number,
                matches: group
                    .into_iter()
                    .map(|m| BracketMatchView {
                        id: m.id,
                        round_number: m.round_number,
                        position: m.position(),
                        next_match_id: m.links.next_match_id,
                        participant1: resolve(&m.participants[0], participants),
                        participant2: resolve(&m.participants[1], participants),
                        winner_id: m.winner(),
                        completed: m.is_completed(),
                        next: m.links.next_match_id.and_then(|id| coordinates(&arena, id)),
                        from: m.links.from.and_then(|(a, b)| {
                            Some([coordinates(&arena, a)?, coordinates(&arena, b)?])
                        }),
                    })
                    .collect(),
            }
        })
        .collect();

    BracketView {
        tournament_id,
        rounds,
    }
}
