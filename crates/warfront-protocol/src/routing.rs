//! Exchange names, routing-key conventions, and shared wire payloads.
//!
//! Routing keys follow a dotted `<category>.<qualifier>` convention
//! (`army_moves.alice`, `war.bob`, `game_logs.alice`) so topic exchanges can
//! fan messages out to per-player queues via wildcard bindings. The one
//! exception is the fixed [`PAUSE_KEY`] on the direct exchange, which every
//! client hears on its own transient queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Topic exchange carrying army moves, war recognitions, and game logs.
pub const EXCHANGE_TOPIC: &str = "warfront_topic";

/// Direct exchange carrying the pause/resume control messages.
pub const EXCHANGE_DIRECT: &str = "warfront_direct";

/// Fallback exchange every queue dead-letters into. Rejected and expired
/// messages land here instead of vanishing.
pub const EXCHANGE_DEAD_LETTER: &str = "warfront_dlx";

/// Fixed routing key for pause/resume control messages.
pub const PAUSE_KEY: &str = "pause";

/// Routing-key category for army movement events.
pub const ARMY_MOVES_PREFIX: &str = "army_moves";

/// Routing-key category for war recognitions.
pub const WAR_RECOGNITION_PREFIX: &str = "war";

/// Routing-key category for the durable game-log stream.
pub const GAME_LOG_PREFIX: &str = "game_logs";

/// Builds a per-player routing key or queue name: `<prefix>.<username>`.
pub fn per_player_key(prefix: &str, username: &str) -> String {
    format!("{prefix}.{username}")
}

/// Builds the wildcard binding pattern for a category: `<prefix>.*`.
pub fn wildcard(prefix: &str) -> String {
    format!("{prefix}.*")
}

/// Server-broadcast pause/resume state, published on the direct exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayingState {
    /// Whether the game is currently paused.
    pub is_paused: bool,
}

/// One durably-logged game event, published with the binary codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameLog {
    /// When the event was logged.
    pub logged_at: DateTime<Utc>,
    /// The player the event originated from.
    pub username: String,
    /// Human-readable description of the event.
    pub message: String,
}
