//! Error type for game commands.

/// Errors returned by interactive game commands.
///
/// These surface as one-line messages in the client REPL; they never
/// terminate the process.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The server has paused the game; spawn/move commands are rejected.
    #[error("the game is paused")]
    Paused,

    /// The territory name didn't parse.
    #[error("unknown territory: {0}")]
    UnknownTerritory(String),

    /// The unit rank didn't parse.
    #[error("unknown rank: {0} (expected infantry, cavalry, or artillery)")]
    UnknownRank(String),

    /// A move referenced a unit ID the player doesn't own.
    #[error("no unit with id {0}")]
    UnknownUnit(u32),

    /// A move command named no units.
    #[error("no units selected")]
    NoUnitsSelected,
}
