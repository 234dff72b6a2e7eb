//! # Tourney
//!
//! A single elimination tournament bracket engine.
//!
//! The engine runs tournaments from registration to champion:
//!
//! - **Tournaments** move through `DRAFT -> PUBLISHED -> STARTED -> COMPLETED`
//!   and can be cancelled at any point before completion.
//! - **Entries** register participants while a tournament is published and
//!   receive increasing seeds.
//! - **Brackets** are generated from the confirmed entries using standard
//!   seeding, with every round materialized up front.
//! - **Results** are recorded per match; winners advance automatically and
//!   scoring the final completes the tournament and fires a webhook.
//!
//! Storage sits behind the repository traits in [`db`]. Every multi-entity
//! write goes through one version-checked [`db::Changeset`], so concurrent
//! sibling results can't both miss each other.
//!
//! ## Core Modules
//!
//! - [`tournament`]: lifecycle, entries and [`TournamentManager`]
//! - [`bracket`]: seeding, construction, advancement and the bracket view
//! - [`matches`]: scores, outcomes and [`MatchManager`]
//! - [`db`]: repository traits, [`MemoryStore`] and [`PgStore`]
//!
//! ## Example
//!
//! ```no_run
//! use tourney::{Engine, EngineContext, NewTournament};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tourney::EngineError> {
//!     let (ctx, _store) = EngineContext::in_memory();
//!     let engine = Engine::new(ctx);
//!
//!     let cup = engine
//!         .tournaments
//!         .create_tournament(NewTournament::single_elimination("Spring Cup", "chess").published())
//!         .await?;
//!     // register entries, then:
//!     // engine.brackets.generate_bracket(cup.id).await?;
//!     # let _ = cup;
//!     Ok(())
//! }
//! ```

/// Bracket seeding, construction, advancement and view.
pub mod bracket;
pub mod context;
/// Storage traits and implementations.
pub mod db;
pub mod errors;
pub mod matches;
pub mod notify;
pub mod ports;
pub mod tournament;

pub use bracket::{BracketManager, BracketView};
pub use context::{Engine, EngineContext};
pub use db::{MemoryStore, PgStore, Store};
pub use errors::{EngineError, EngineResult};
pub use matches::{Match, MatchId, MatchManager, ResultUpdate, ScoreInput, Slot};
pub use notify::{WebhookPayload, WebhookSink};
pub use tournament::{
    EntryStatus, NewTournament, Participant, ParticipantId, ParticipantType, Tournament,
    TournamentEntry, TournamentId, TournamentManager, TournamentStatus,
};
