//! Matches: slots, scores and results.
//!
//! Recording a result derives both sides' outcome from the scores and moves
//! the winner forward through the bracket; see [`MatchManager`].

pub mod manager;
pub mod models;

pub use manager::{MatchManager, ResultUpdate};
pub use models::{
    Match, MatchId, MatchLinks, MatchParticipant, MatchResult, Outcome, PENDING_SLOT_PREFIX,
    ScoreInput, Slot,
};
