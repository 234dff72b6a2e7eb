//! Flat, id-keyed storage for one tournament's matches.
//!
//! Matches reference each other only by id (`from`, `next_match_id`), so the
//! bracket tree lives in a map rather than in nested ownership.

use std::collections::HashMap;

use super::seeding::{next_round_position, partner_position};
use crate::matches::{Match, MatchId};

#[derive(Debug, Clone, Default)]
pub struct Arena {
    matches: HashMap<MatchId, Match>,
}

impl Arena {
    pub fn new(matches: impl IntoIterator<Item = Match>) -> Self {
        Self {
            matches: matches.into_iter().map(|m| (m.id, m)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn get(&self, id: MatchId) -> Option<&Match> {
        self.matches.get(&id)
    }

    pub fn get_mut(&mut self, id: MatchId) -> Option<&mut Match> {
        self.matches.get_mut(&id)
    }

    pub fn insert(&mut self, m: Match) {
        self.matches.insert(m.id, m);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Match> {
        self.matches.values()
    }

    /// Highest round number present
    pub fn max_round(&self) -> u32 {
        self.matches
            .values()
            .map(|m| m.round_number)
            .max()
            .unwrap_or(0)
    }

    pub fn find_at(&self, round: u32, position: u32) -> Option<&Match> {
        self.matches
            .values()
            .find(|m| m.round_number == round && m.position() == position)
    }

    /// Sibling match in the same round
    pub fn partner_of(&self, m: &Match) -> Option<&Match> {
        self.find_at(m.round_number, partner_position(m.position()))
    }

    /// Match fed by `m`: the linked one if the link is set, otherwise the one
    /// at the expected coordinates of the next round.
    pub fn parent_of(&self, m: &Match) -> Option<&Match> {
        match m.links.next_match_id {
            Some(next) => self.get(next),
            None => self.find_at(m.round_number + 1, next_round_position(m.position())),
        }
    }

    /// Matches ordered by round, then position
    pub fn into_sorted(self) -> Vec<Match> {
        let mut matches: Vec<Match> = self.matches.into_values().collect();
        matches.sort_by_key(|m| (m.round_number, m.position()));
        matches
    }
}
