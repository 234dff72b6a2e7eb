//! Tournaments and their entries.
//!
//! This module provides:
//! - The tournament lifecycle (draft, published, started, completed, cancelled)
//! - Participant registration, withdrawal and seeding order
//! - [`TournamentManager`], which runs these against a [`Store`](crate::db::Store)
//!
//! ## Example
//!
//! ```no_run
//! use tourney::{EngineContext, tournament::{NewTournament, TournamentManager}};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (ctx, _store) = EngineContext::in_memory();
//!     let tournaments = TournamentManager::new(ctx);
//!
//!     let cup = tournaments
//!         .create_tournament(NewTournament::single_elimination("Spring Cup", "chess").published())
//!         .await?;
//!     println!("Created tournament: {}", cup.id);
//!
//!     Ok(())
//! }
//! ```

pub mod entry;
pub mod manager;
pub mod models;

pub use entry::{EntryId, EntryStatus, TournamentEntry, next_seed};
pub use manager::TournamentManager;
pub use models::{
    NewTournament, Participant, ParticipantId, ParticipantType, Tournament, TournamentFormat,
    TournamentId, TournamentStatus,
};
