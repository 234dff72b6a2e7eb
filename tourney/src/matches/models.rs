//! Match data models: slots, scores, outcomes and bracket links.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::{
    errors::{EngineError, EngineResult},
    tournament::{ParticipantId, TournamentId},
};

/// Match ID type
pub type MatchId = Uuid;

/// Prefix of the placeholder a slot carries until its feeding match is decided
pub const PENDING_SLOT_PREFIX: &str = "TBD_";

/// Who sits in one side of a match.
///
/// Stored and serialized as either the participant id or `TBD_<matchId>`,
/// where the match id names the earlier match whose winner will fill it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Slot {
    Participant(ParticipantId),
    Pending(MatchId),
}

impl Slot {
    pub fn participant(&self) -> Option<ParticipantId> {
        match self {
            Slot::Participant(id) => Some(*id),
            Slot::Pending(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Slot::Pending(_))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Participant(id) => write!(f, "{id}"),
            Slot::Pending(match_id) => write!(f, "{PENDING_SLOT_PREFIX}{match_id}"),
        }
    }
}

impl FromStr for Slot {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (raw, pending) = match s.strip_prefix(PENDING_SLOT_PREFIX) {
            Some(rest) => (rest, true),
            None => (s, false),
        };

        let id = Uuid::parse_str(raw)
            .map_err(|e| EngineError::Corrupt(format!("invalid slot '{s}': {e}")))?;

        Ok(if pending {
            Slot::Pending(id)
        } else {
            Slot::Participant(id)
        })
    }
}

impl From<Slot> for String {
    fn from(slot: Slot) -> Self {
        slot.to_string()
    }
}

impl TryFrom<String> for Slot {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Per-side result of a completed match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchResult {
    Win,
    Loss,
    Draw,
}

impl MatchResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchResult::Win => "win",
            MatchResult::Loss => "loss",
            MatchResult::Draw => "draw",
        }
    }
}

impl FromStr for MatchResult {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win" => Ok(MatchResult::Win),
            "loss" => Ok(MatchResult::Loss),
            "draw" => Ok(MatchResult::Draw),
            other => Err(EngineError::Corrupt(format!("unknown match result '{other}'"))),
        }
    }
}

/// One side of a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchParticipant {
    #[serde(rename = "participantId")]
    pub slot: Slot,
    pub score: Option<i64>,
    pub result: Option<MatchResult>,
}

impl MatchParticipant {
    pub fn open(slot: Slot) -> Self {
        Self {
            slot,
            score: None,
            result: None,
        }
    }
}

/// A reported score for one participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreInput {
    pub participant_id: ParticipantId,
    pub score: i64,
}

impl ScoreInput {
    pub fn new(participant_id: ParticipantId, score: i64) -> Self {
        Self {
            participant_id,
            score,
        }
    }
}

/// The decided outcome of a match, from which both sides' results derive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner {
        winner: ParticipantId,
        loser: ParticipantId,
    },
    Draw,
}

impl Outcome {
    /// Higher score wins; equal scores draw. No further tie-break.
    pub fn decide(a: &ScoreInput, b: &ScoreInput) -> Self {
        use std::cmp::Ordering;

        match a.score.cmp(&b.score) {
            Ordering::Greater => Outcome::Winner {
                winner: a.participant_id,
                loser: b.participant_id,
            },
            Ordering::Less => Outcome::Winner {
                winner: b.participant_id,
                loser: a.participant_id,
            },
            Ordering::Equal => Outcome::Draw,
        }
    }

    pub fn winner(&self) -> Option<ParticipantId> {
        match self {
            Outcome::Winner { winner, .. } => Some(*winner),
            Outcome::Draw => None,
        }
    }

    /// Result as seen from one participant's side
    pub fn result_for(&self, participant: ParticipantId) -> MatchResult {
        match self {
            Outcome::Winner { winner, .. } if *winner == participant => MatchResult::Win,
            Outcome::Winner { .. } => MatchResult::Loss,
            Outcome::Draw => MatchResult::Draw,
        }
    }
}

/// Where a match sits in the bracket tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchLinks {
    /// 1-based index within its round
    pub position: u32,
    /// The two earlier matches feeding this one, in slot order
    pub from: Option<(MatchId, MatchId)>,
    /// The match this one's winner feeds into
    pub next_match_id: Option<MatchId>,
}

/// A match between two slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub round_number: u32,
    pub participants: [MatchParticipant; 2],
    pub completed_at: Option<DateTime<Utc>>,
    pub links: MatchLinks,
    pub created_at: DateTime<Utc>,
    pub version: i64,
}

impl Match {
    pub fn new(
        id: MatchId,
        tournament_id: TournamentId,
        round_number: u32,
        position: u32,
        slots: [Slot; 2],
        now: DateTime<Utc>,
    ) -> EngineResult<Self> {
        if round_number == 0 || position == 0 {
            return Err(EngineError::Validation(
                "round number and position are 1-based".to_string(),
            ));
        }
        if slots[0] == slots[1] {
            return Err(EngineError::Validation(format!(
                "both sides of a match can't be {}",
                slots[0]
            )));
        }

        let [a, b] = slots;
        Ok(Self {
            id,
            tournament_id,
            round_number,
            participants: [MatchParticipant::open(a), MatchParticipant::open(b)],
            completed_at: None,
            links: MatchLinks {
                position,
                from: None,
                next_match_id: None,
            },
            created_at: now,
            version: 0,
        })
    }

    pub fn position(&self) -> u32 {
        self.links.position
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Both slots hold real participants
    pub fn is_playable(&self) -> bool {
        self.participants.iter().all(|p| !p.slot.is_pending())
    }

    /// Participant whose side is marked as the win
    pub fn winner(&self) -> Option<ParticipantId> {
        self.participants
            .iter()
            .find(|p| p.result == Some(MatchResult::Win))
            .and_then(|p| p.slot.participant())
    }

    fn slot_index(&self, participant: ParticipantId) -> Option<usize> {
        self.participants
            .iter()
            .position(|p| p.slot == Slot::Participant(participant))
    }

    /// Write scores and derived results onto both sides.
    ///
    /// Validates both ids before touching anything.
    fn apply_scores(&mut self, scores: &[ScoreInput; 2]) -> EngineResult<Outcome> {
        let [a, b] = scores;
        let ia = self
            .slot_index(a.participant_id)
            .ok_or(EngineError::ParticipantNotInMatch(a.participant_id))?;
        let ib = self
            .slot_index(b.participant_id)
            .ok_or(EngineError::ParticipantNotInMatch(b.participant_id))?;
        if ia == ib {
            return Err(EngineError::ParticipantNotInMatch(b.participant_id));
        }

        let outcome = Outcome::decide(a, b);
        for (index, input) in [(ia, a), (ib, b)] {
            let side = &mut self.participants[index];
            side.score = Some(input.score);
            side.result = Some(outcome.result_for(input.participant_id));
        }

        Ok(outcome)
    }

    /// Score an open match
    pub fn record(&mut self, scores: &[ScoreInput; 2], now: DateTime<Utc>) -> EngineResult<Outcome> {
        if self.is_completed() {
            return Err(EngineError::MatchAlreadyCompleted(self.id));
        }
        let outcome = self.apply_scores(scores)?;
        self.completed_at = Some(now);
        Ok(outcome)
    }

    /// Replace the scores of a completed match
    pub fn edit(&mut self, scores: &[ScoreInput; 2]) -> EngineResult<Outcome> {
        if !self.is_completed() {
            return Err(EngineError::MatchNotCompleted(self.id));
        }
        self.apply_scores(scores)
    }

    /// Return a completed match to open
    pub fn annul(&mut self) -> EngineResult<()> {
        if !self.is_completed() {
            return Err(EngineError::MatchNotCompleted(self.id));
        }
        for side in &mut self.participants {
            side.score = None;
            side.result = None;
        }
        self.completed_at = None;
        Ok(())
    }

    /// Overwrite both sides with new occupants and clear any scores
    pub fn seat(&mut self, slots: [Slot; 2]) {
        let [a, b] = slots;
        self.participants = [MatchParticipant::open(a), MatchParticipant::open(b)];
    }

    /// Replace one side, keeping the other
    pub fn set_slot(&mut self, index: usize, slot: Slot) {
        self.participants[index] = MatchParticipant::open(slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(n: u128) -> ParticipantId {
        Uuid::from_u128(n)
    }

    fn open_match() -> Match {
        Match::new(
            Uuid::from_u128(100),
            Uuid::from_u128(200),
            1,
            1,
            [Slot::Participant(pid(1)), Slot::Participant(pid(2))],
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_slot_storage_form() {
        let m = Uuid::from_u128(7);
        let pending = Slot::Pending(m);
        assert_eq!(pending.to_string(), format!("TBD_{m}"));
        assert_eq!(pending.to_string().parse::<Slot>().unwrap(), pending);

        let real = Slot::Participant(pid(3));
        assert_eq!(real.to_string().parse::<Slot>().unwrap(), real);

        assert!("TBD_not-a-uuid".parse::<Slot>().is_err());
    }

    #[test]
    fn test_slot_serializes_as_string() {
        let json = serde_json::to_string(&Slot::Pending(Uuid::nil())).unwrap();
        assert_eq!(json, "\"TBD_00000000-0000-0000-0000-000000000000\"");
    }

    #[test]
    fn test_outcome_derivation() {
        let a = ScoreInput::new(pid(1), 3);
        let b = ScoreInput::new(pid(2), 1);

        let outcome = Outcome::decide(&a, &b);
        assert_eq!(outcome.winner(), Some(pid(1)));
        assert_eq!(outcome.result_for(pid(1)), MatchResult::Win);
        assert_eq!(outcome.result_for(pid(2)), MatchResult::Loss);

        let outcome = Outcome::decide(&b, &a);
        assert_eq!(outcome.winner(), Some(pid(1)));

        let draw = Outcome::decide(&a, &ScoreInput::new(pid(2), 3));
        assert_eq!(draw, Outcome::Draw);
        assert_eq!(draw.result_for(pid(1)), MatchResult::Draw);
    }

    #[test]
    fn test_record_sets_both_sides() {
        let mut m = open_match();
        // Reported in reverse slot order on purpose
        let outcome = m
            .record(
                &[ScoreInput::new(pid(2), 0), ScoreInput::new(pid(1), 2)],
                Utc::now(),
            )
            .unwrap();

        assert_eq!(outcome.winner(), Some(pid(1)));
        assert_eq!(m.participants[0].score, Some(2));
        assert_eq!(m.participants[0].result, Some(MatchResult::Win));
        assert_eq!(m.participants[1].result, Some(MatchResult::Loss));
        assert!(m.is_completed());
        assert_eq!(m.winner(), Some(pid(1)));
    }

    #[test]
    fn test_record_twice_fails_without_mutation() {
        let mut m = open_match();
        m.record(
            &[ScoreInput::new(pid(1), 1), ScoreInput::new(pid(2), 0)],
            Utc::now(),
        )
        .unwrap();
        let before = m.clone();

        let err = m
            .record(
                &[ScoreInput::new(pid(1), 0), ScoreInput::new(pid(2), 5)],
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::MatchAlreadyCompleted(_)));
        assert_eq!(m, before);
    }

    #[test]
    fn test_unknown_participant_leaves_match_untouched() {
        let mut m = open_match();
        let before = m.clone();

        let err = m
            .record(
                &[ScoreInput::new(pid(1), 1), ScoreInput::new(pid(9), 0)],
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::ParticipantNotInMatch(id) if id == pid(9)));
        assert_eq!(m, before);
    }

    #[test]
    fn test_same_participant_twice_is_rejected() {
        let mut m = open_match();
        let err = m
            .record(
                &[ScoreInput::new(pid(1), 1), ScoreInput::new(pid(1), 0)],
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::ParticipantNotInMatch(_)));
        assert!(!m.is_completed());
    }

    #[test]
    fn test_draw_has_no_winner() {
        let mut m = open_match();
        m.record(
            &[ScoreInput::new(pid(1), 2), ScoreInput::new(pid(2), 2)],
            Utc::now(),
        )
        .unwrap();
        assert_eq!(m.winner(), None);
        assert!(m.participants.iter().all(|p| p.result == Some(MatchResult::Draw)));
    }

    #[test]
    fn test_edit_requires_completion() {
        let mut m = open_match();
        let err = m
            .edit(&[ScoreInput::new(pid(1), 1), ScoreInput::new(pid(2), 0)])
            .unwrap_err();
        assert!(matches!(err, EngineError::MatchNotCompleted(_)));
    }

    #[test]
    fn test_annul_reopens_match() {
        let mut m = open_match();
        m.record(
            &[ScoreInput::new(pid(1), 1), ScoreInput::new(pid(2), 0)],
            Utc::now(),
        )
        .unwrap();

        m.annul().unwrap();
        assert!(!m.is_completed());
        assert!(m.participants.iter().all(|p| p.score.is_none() && p.result.is_none()));
        assert!(m.annul().is_err());
    }

    #[test]
    fn test_identical_slots_rejected() {
        let result = Match::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            1,
            1,
            [Slot::Participant(pid(1)), Slot::Participant(pid(1))],
            Utc::now(),
        );
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }
}
