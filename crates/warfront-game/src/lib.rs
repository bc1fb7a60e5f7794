//! Game rules for Warfront.
//!
//! The messaging core treats this crate as an external collaborator: it
//! supplies typed payloads ([`ArmyMove`], [`RecognitionOfWar`]) and handlers
//! that turn game outcomes into acknowledgment dispositions. The rules
//! themselves — spawning, movement, war resolution — live in [`GameState`]
//! and know nothing about brokers or queues.

mod error;
mod handlers;
mod state;

pub use error::GameError;
pub use handlers::{MoveHandler, PauseHandler, SharedGameState, WarHandler};
pub use state::{
    ArmyMove, GameState, MoveOutcome, Player, RecognitionOfWar, Territory, Unit, UnitRank,
    WarOutcome, gibberish_log_line,
};
