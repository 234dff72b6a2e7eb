//! Single elimination brackets.
//!
//! - [`seeding`]: standard seed placement for the first round
//! - [`builder`]: materializes every round up front
//! - [`advance`]: moves winners into the next round
//! - [`view`]: round-by-round read model
//!
//! Only power-of-two fields are supported; there are no byes.

pub mod advance;
pub mod arena;
pub mod builder;
pub mod manager;
pub mod seeding;
pub mod view;

pub use advance::{AdvancePlan, Advancement};
pub use arena::Arena;
pub use builder::build_bracket;
pub use manager::BracketManager;
pub use view::{BracketMatchView, BracketRoundView, BracketView, Coordinates, ParticipantView};
