//! The army state machine: spawning, movement, pause, and war resolution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::GameError;

/// One of the six territories armies occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Territory {
    Americas,
    Europe,
    Africa,
    Asia,
    Antarctica,
    Australia,
}

impl Territory {
    /// Every territory, for help output.
    pub const ALL: [Territory; 6] = [
        Territory::Americas,
        Territory::Europe,
        Territory::Africa,
        Territory::Asia,
        Territory::Antarctica,
        Territory::Australia,
    ];
}

impl fmt::Display for Territory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Territory::Americas => "americas",
            Territory::Europe => "europe",
            Territory::Africa => "africa",
            Territory::Asia => "asia",
            Territory::Antarctica => "antarctica",
            Territory::Australia => "australia",
        };
        f.write_str(s)
    }
}

impl FromStr for Territory {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "americas" => Ok(Territory::Americas),
            "europe" => Ok(Territory::Europe),
            "africa" => Ok(Territory::Africa),
            "asia" => Ok(Territory::Asia),
            "antarctica" => Ok(Territory::Antarctica),
            "australia" => Ok(Territory::Australia),
            other => Err(GameError::UnknownTerritory(other.to_string())),
        }
    }
}

/// Rank of a unit, determining its weight in war resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitRank {
    Infantry,
    Cavalry,
    Artillery,
}

impl UnitRank {
    /// Contribution to an army's total power.
    pub fn battle_weight(self) -> u32 {
        match self {
            UnitRank::Infantry => 1,
            UnitRank::Cavalry => 5,
            UnitRank::Artillery => 10,
        }
    }
}

impl fmt::Display for UnitRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnitRank::Infantry => "infantry",
            UnitRank::Cavalry => "cavalry",
            UnitRank::Artillery => "artillery",
        };
        f.write_str(s)
    }
}

impl FromStr for UnitRank {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "infantry" => Ok(UnitRank::Infantry),
            "cavalry" => Ok(UnitRank::Cavalry),
            "artillery" => Ok(UnitRank::Artillery),
            other => Err(GameError::UnknownRank(other.to_string())),
        }
    }
}

/// One army unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Player-local identifier, assigned at spawn.
    pub id: u32,
    /// The unit's rank.
    pub rank: UnitRank,
    /// Where the unit currently stands.
    pub location: Territory,
}

/// A player and their army, as carried on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// The player's unique name.
    pub username: String,
    /// The player's units.
    pub units: Vec<Unit>,
}

/// A move event: `player` relocated `units` to `to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmyMove {
    /// The moving player, with a snapshot of their full army.
    pub player: Player,
    /// The units that moved.
    pub units: Vec<Unit>,
    /// The destination territory.
    pub to: Territory,
}

/// A declaration that `attacker` has engaged `defender`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionOfWar {
    /// The player whose move triggered the war.
    pub attacker: Player,
    /// The player whose territory was moved into.
    pub defender: Player,
}

/// Outcome of observing another player's (or one's own echoed) move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move was the local player's own, echoed back by the wildcard
    /// binding. Nothing to do, and nothing to retry.
    SamePlayer,
    /// No overlap with the local army.
    Safe,
    /// The mover landed on a territory the local army occupies.
    MakeWar,
}

/// Outcome of resolving a war recognition against local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarOutcome {
    /// The local player is neither attacker nor defender.
    NotInvolved,
    /// One side has no units; the recognition is stale or malformed.
    NoUnits,
    /// The local player lost.
    OpponentWon {
        /// Winning player's name.
        winner: String,
        /// Losing player's name.
        loser: String,
    },
    /// The local player won.
    YouWon {
        /// Winning player's name.
        winner: String,
        /// Losing player's name.
        loser: String,
    },
    /// Equal power on both sides.
    Draw {
        /// The attacking player's name.
        attacker: String,
        /// The defending player's name.
        defender: String,
    },
}

/// The local player's view of the game.
pub struct GameState {
    player: Player,
    paused: bool,
    next_unit_id: u32,
}

impl GameState {
    /// Fresh state for `username` with no units.
    pub fn new(username: &str) -> Self {
        Self {
            player: Player {
                username: username.to_string(),
                units: Vec::new(),
            },
            paused: false,
            next_unit_id: 1,
        }
    }

    /// The local player's name.
    pub fn username(&self) -> &str {
        &self.player.username
    }

    /// A clone of the local player suitable for putting on the wire.
    pub fn player_snapshot(&self) -> Player {
        self.player.clone()
    }

    /// Whether the server has paused the game.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Applies a server pause/resume broadcast.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Spawns a new unit at `location`, returning its ID.
    ///
    /// # Errors
    /// [`GameError::Paused`] while the game is paused.
    pub fn command_spawn(&mut self, location: Territory, rank: UnitRank) -> Result<u32, GameError> {
        if self.paused {
            return Err(GameError::Paused);
        }
        let id = self.next_unit_id;
        self.next_unit_id += 1;
        self.player.units.push(Unit { id, rank, location });
        Ok(id)
    }

    /// Moves the units named by `ids` to `to`, returning the [`ArmyMove`]
    /// event to publish.
    ///
    /// # Errors
    /// [`GameError::Paused`], [`GameError::NoUnitsSelected`], or
    /// [`GameError::UnknownUnit`] for an ID the player doesn't own. On any
    /// error, no unit has moved.
    pub fn command_move(&mut self, to: Territory, ids: &[u32]) -> Result<ArmyMove, GameError> {
        if self.paused {
            return Err(GameError::Paused);
        }
        if ids.is_empty() {
            return Err(GameError::NoUnitsSelected);
        }
        // Validate the whole selection before mutating anything.
        for id in ids {
            if !self.player.units.iter().any(|u| u.id == *id) {
                return Err(GameError::UnknownUnit(*id));
            }
        }

        let mut moved = Vec::with_capacity(ids.len());
        for unit in &mut self.player.units {
            if ids.contains(&unit.id) {
                unit.location = to;
                moved.push(unit.clone());
            }
        }

        Ok(ArmyMove {
            player: self.player.clone(),
            units: moved,
            to,
        })
    }

    /// Human-readable status summary for the REPL.
    pub fn command_status(&self) -> String {
        let mut out = format!(
            "player: {}\npaused: {}\nunits: {}\n",
            self.player.username,
            self.paused,
            self.player.units.len()
        );
        for unit in &self.player.units {
            out.push_str(&format!(
                "  [{}] {} at {}\n",
                unit.id, unit.rank, unit.location
            ));
        }
        out
    }

    /// Classifies an observed move against the local army.
    pub fn handle_move(&self, mv: &ArmyMove) -> MoveOutcome {
        if mv.player.username == self.player.username {
            return MoveOutcome::SamePlayer;
        }
        if self.player.units.iter().any(|u| u.location == mv.to) {
            MoveOutcome::MakeWar
        } else {
            MoveOutcome::Safe
        }
    }

    /// Resolves a war recognition: compares army power and, when the local
    /// player loses (or draws), removes their units at the contested
    /// territory.
    pub fn handle_war(&mut self, rw: &RecognitionOfWar) -> WarOutcome {
        let me = self.player.username.clone();
        if rw.attacker.username != me && rw.defender.username != me {
            return WarOutcome::NotInvolved;
        }
        if rw.attacker.units.is_empty() || rw.defender.units.is_empty() {
            return WarOutcome::NoUnits;
        }

        let attacker_power = army_power(&rw.attacker.units);
        let defender_power = army_power(&rw.defender.units);
        let contested = contested_territory(&rw.attacker, &rw.defender);

        if attacker_power == defender_power {
            if let Some(t) = contested {
                self.remove_units_at(t);
            }
            return WarOutcome::Draw {
                attacker: rw.attacker.username.clone(),
                defender: rw.defender.username.clone(),
            };
        }

        let (winner, loser) = if attacker_power > defender_power {
            (rw.attacker.username.clone(), rw.defender.username.clone())
        } else {
            (rw.defender.username.clone(), rw.attacker.username.clone())
        };

        if loser == me {
            if let Some(t) = contested {
                self.remove_units_at(t);
            }
            WarOutcome::OpponentWon { winner, loser }
        } else {
            WarOutcome::YouWon { winner, loser }
        }
    }

    fn remove_units_at(&mut self, territory: Territory) {
        self.player.units.retain(|u| u.location != territory);
    }
}

fn army_power(units: &[Unit]) -> u32 {
    units.iter().map(|u| u.rank.battle_weight()).sum()
}

/// First territory where both armies have units, if any.
fn contested_territory(attacker: &Player, defender: &Player) -> Option<Territory> {
    attacker
        .units
        .iter()
        .map(|u| u.location)
        .find(|t| defender.units.iter().any(|u| u.location == *t))
}

/// A nonsense log line for the `spam` command.
pub fn gibberish_log_line() -> &'static str {
    use rand::Rng;

    const LINES: [&str; 6] = [
        "the cavalry has run out of biscuits",
        "antarctica reports unseasonable warmth",
        "a pigeon has defected to the enemy",
        "supply wagons lost somewhere near asia",
        "artillery crew arguing about map projections",
        "morale inexplicably high",
    ];
    LINES[rand::rng().random_range(0..LINES.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: u32, rank: UnitRank, location: Territory) -> Unit {
        Unit { id, rank, location }
    }

    fn player(username: &str, units: Vec<Unit>) -> Player {
        Player {
            username: username.into(),
            units,
        }
    }

    #[test]
    fn test_spawn_assigns_sequential_ids() {
        let mut gs = GameState::new("alice");
        let a = gs.command_spawn(Territory::Europe, UnitRank::Infantry).unwrap();
        let b = gs.command_spawn(Territory::Asia, UnitRank::Cavalry).unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(gs.player_snapshot().units.len(), 2);
    }

    #[test]
    fn test_commands_rejected_while_paused() {
        let mut gs = GameState::new("alice");
        gs.set_paused(true);
        assert!(matches!(
            gs.command_spawn(Territory::Europe, UnitRank::Infantry),
            Err(GameError::Paused)
        ));
        assert!(matches!(
            gs.command_move(Territory::Asia, &[1]),
            Err(GameError::Paused)
        ));
    }

    #[test]
    fn test_move_relocates_selected_units() {
        let mut gs = GameState::new("alice");
        let a = gs.command_spawn(Territory::Europe, UnitRank::Infantry).unwrap();
        let b = gs.command_spawn(Territory::Europe, UnitRank::Cavalry).unwrap();

        let mv = gs.command_move(Territory::Asia, &[a]).unwrap();
        assert_eq!(mv.to, Territory::Asia);
        assert_eq!(mv.units.len(), 1);
        assert_eq!(mv.units[0].id, a);

        let snapshot = gs.player_snapshot();
        let moved = snapshot.units.iter().find(|u| u.id == a).unwrap();
        let stayed = snapshot.units.iter().find(|u| u.id == b).unwrap();
        assert_eq!(moved.location, Territory::Asia);
        assert_eq!(stayed.location, Territory::Europe);
    }

    #[test]
    fn test_move_with_unknown_unit_mutates_nothing() {
        let mut gs = GameState::new("alice");
        let a = gs.command_spawn(Territory::Europe, UnitRank::Infantry).unwrap();
        let err = gs.command_move(Territory::Asia, &[a, 99]).unwrap_err();
        assert!(matches!(err, GameError::UnknownUnit(99)));
        assert_eq!(gs.player_snapshot().units[0].location, Territory::Europe);
    }

    #[test]
    fn test_handle_move_outcomes() {
        let mut gs = GameState::new("alice");
        gs.command_spawn(Territory::Europe, UnitRank::Infantry).unwrap();

        let own_echo = ArmyMove {
            player: gs.player_snapshot(),
            units: vec![],
            to: Territory::Europe,
        };
        assert_eq!(gs.handle_move(&own_echo), MoveOutcome::SamePlayer);

        let safe = ArmyMove {
            player: player("bob", vec![unit(1, UnitRank::Infantry, Territory::Asia)]),
            units: vec![],
            to: Territory::Asia,
        };
        assert_eq!(gs.handle_move(&safe), MoveOutcome::Safe);

        let clash = ArmyMove {
            player: player("bob", vec![unit(1, UnitRank::Infantry, Territory::Europe)]),
            units: vec![],
            to: Territory::Europe,
        };
        assert_eq!(gs.handle_move(&clash), MoveOutcome::MakeWar);
    }

    #[test]
    fn test_handle_war_not_involved() {
        let mut gs = GameState::new("carol");
        let rw = RecognitionOfWar {
            attacker: player("alice", vec![unit(1, UnitRank::Infantry, Territory::Asia)]),
            defender: player("bob", vec![unit(1, UnitRank::Infantry, Territory::Asia)]),
        };
        assert_eq!(gs.handle_war(&rw), WarOutcome::NotInvolved);
    }

    #[test]
    fn test_handle_war_no_units() {
        let mut gs = GameState::new("bob");
        let rw = RecognitionOfWar {
            attacker: player("alice", vec![]),
            defender: player("bob", vec![unit(1, UnitRank::Infantry, Territory::Asia)]),
        };
        assert_eq!(gs.handle_war(&rw), WarOutcome::NoUnits);
    }

    #[test]
    fn test_handle_war_loss_removes_contested_units() {
        let mut gs = GameState::new("bob");
        gs.command_spawn(Territory::Asia, UnitRank::Infantry).unwrap();
        gs.command_spawn(Territory::Europe, UnitRank::Infantry).unwrap();

        let rw = RecognitionOfWar {
            attacker: player("alice", vec![unit(1, UnitRank::Artillery, Territory::Asia)]),
            defender: gs.player_snapshot(),
        };
        let outcome = gs.handle_war(&rw);
        assert_eq!(
            outcome,
            WarOutcome::OpponentWon {
                winner: "alice".into(),
                loser: "bob".into()
            }
        );
        // The Asia unit is gone, the Europe unit survives.
        let snapshot = gs.player_snapshot();
        assert_eq!(snapshot.units.len(), 1);
        assert_eq!(snapshot.units[0].location, Territory::Europe);
    }

    #[test]
    fn test_handle_war_victory_keeps_units() {
        let mut gs = GameState::new("bob");
        gs.command_spawn(Territory::Asia, UnitRank::Artillery).unwrap();

        let rw = RecognitionOfWar {
            attacker: player("alice", vec![unit(1, UnitRank::Infantry, Territory::Asia)]),
            defender: gs.player_snapshot(),
        };
        let outcome = gs.handle_war(&rw);
        assert_eq!(
            outcome,
            WarOutcome::YouWon {
                winner: "bob".into(),
                loser: "alice".into()
            }
        );
        assert_eq!(gs.player_snapshot().units.len(), 1);
    }

    #[test]
    fn test_handle_war_draw() {
        let mut gs = GameState::new("bob");
        gs.command_spawn(Territory::Asia, UnitRank::Cavalry).unwrap();

        let rw = RecognitionOfWar {
            attacker: player("alice", vec![unit(1, UnitRank::Cavalry, Territory::Asia)]),
            defender: gs.player_snapshot(),
        };
        let outcome = gs.handle_war(&rw);
        assert_eq!(
            outcome,
            WarOutcome::Draw {
                attacker: "alice".into(),
                defender: "bob".into()
            }
        );
        // Draws destroy both sides' contested units.
        assert!(gs.player_snapshot().units.is_empty());
    }

    #[test]
    fn test_territory_and_rank_parsing() {
        assert_eq!("Europe".parse::<Territory>().unwrap(), Territory::Europe);
        assert!(matches!(
            "atlantis".parse::<Territory>(),
            Err(GameError::UnknownTerritory(_))
        ));
        assert_eq!("CAVALRY".parse::<UnitRank>().unwrap(), UnitRank::Cavalry);
        assert!(matches!(
            "wizard".parse::<UnitRank>(),
            Err(GameError::UnknownRank(_))
        ));
    }
}
