//! Message handlers: the seam between game rules and the delivery loop.
//!
//! Each handler owns a share of the game state and, where it needs to emit
//! follow-up messages, a publisher on its own session — never the session
//! its delivery loop consumes on.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use warfront_protocol::routing::{
    EXCHANGE_TOPIC, GAME_LOG_PREFIX, GameLog, PlayingState, WAR_RECOGNITION_PREFIX, per_player_key,
};
use warfront_protocol::{BincodeCodec, JsonCodec};
use warfront_pubsub::{BrokerSession, Disposition, MessageHandler, Publisher};

use crate::{ArmyMove, GameState, MoveOutcome, RecognitionOfWar, WarOutcome};

/// Game state shared between the REPL task and the handler tasks.
pub type SharedGameState = Arc<Mutex<GameState>>;

/// Applies server pause/resume broadcasts. Always acks.
pub struct PauseHandler {
    state: SharedGameState,
}

impl PauseHandler {
    /// Builds the handler over shared state.
    pub fn new(state: SharedGameState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl MessageHandler<PlayingState> for PauseHandler {
    async fn handle(&mut self, payload: PlayingState) -> Disposition {
        self.state.lock().await.set_paused(payload.is_paused);
        if payload.is_paused {
            tracing::info!("game paused by server");
        } else {
            tracing::info!("game resumed by server");
        }
        Disposition::Ack
    }
}

/// Reacts to other players' army moves, declaring war on territory clashes.
pub struct MoveHandler<S> {
    state: SharedGameState,
    publisher: Arc<Publisher<S>>,
}

impl<S: BrokerSession> MoveHandler<S> {
    /// Builds the handler over shared state and a publishing session.
    pub fn new(state: SharedGameState, publisher: Arc<Publisher<S>>) -> Self {
        Self { state, publisher }
    }
}

#[async_trait]
impl<S: BrokerSession> MessageHandler<ArmyMove> for MoveHandler<S> {
    async fn handle(&mut self, payload: ArmyMove) -> Disposition {
        let (outcome, defender) = {
            let state = self.state.lock().await;
            (state.handle_move(&payload), state.player_snapshot())
        };

        match outcome {
            MoveOutcome::Safe => {
                tracing::info!(player = %payload.player.username, to = %payload.to, "move observed");
                Disposition::Ack
            }
            // Our own move echoed back through the wildcard binding; there
            // is nothing to process and redelivery would never help.
            MoveOutcome::SamePlayer => Disposition::NackDiscard,
            MoveOutcome::MakeWar => {
                let key = per_player_key(WAR_RECOGNITION_PREFIX, &defender.username);
                let declaration = RecognitionOfWar {
                    attacker: payload.player,
                    defender,
                };
                tracing::info!(attacker = %declaration.attacker.username, "war declared");
                match self
                    .publisher
                    .publish(&JsonCodec, EXCHANGE_TOPIC, &key, &declaration)
                    .await
                {
                    Ok(()) => Disposition::Ack,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to publish war declaration");
                        Disposition::NackRequeue
                    }
                }
            }
        }
    }
}

/// Resolves war recognitions and publishes the result to the durable
/// game-log stream.
pub struct WarHandler<S> {
    state: SharedGameState,
    publisher: Arc<Publisher<S>>,
}

impl<S: BrokerSession> WarHandler<S> {
    /// Builds the handler over shared state and a publishing session.
    pub fn new(state: SharedGameState, publisher: Arc<Publisher<S>>) -> Self {
        Self { state, publisher }
    }

    async fn publish_war_log(&self, attacker: &str, message: String) -> Disposition {
        let username = self.state.lock().await.username().to_string();
        let log = GameLog {
            logged_at: Utc::now(),
            username,
            message,
        };
        let key = per_player_key(GAME_LOG_PREFIX, attacker);
        match self
            .publisher
            .publish(&BincodeCodec, EXCHANGE_TOPIC, &key, &log)
            .await
        {
            Ok(()) => Disposition::Ack,
            Err(e) => {
                tracing::warn!(error = %e, "failed to publish war log");
                Disposition::NackRequeue
            }
        }
    }
}

#[async_trait]
impl<S: BrokerSession> MessageHandler<RecognitionOfWar> for WarHandler<S> {
    async fn handle(&mut self, payload: RecognitionOfWar) -> Disposition {
        let outcome = self.state.lock().await.handle_war(&payload);
        let attacker = payload.attacker.username.clone();

        match outcome {
            // Another pair's war: leave it for the involved players, who
            // share this durable queue.
            WarOutcome::NotInvolved => Disposition::NackRequeue,
            WarOutcome::NoUnits => {
                tracing::warn!(%attacker, "war recognition with an empty army, discarding");
                Disposition::NackDiscard
            }
            WarOutcome::OpponentWon { winner, loser } | WarOutcome::YouWon { winner, loser } => {
                self.publish_war_log(&attacker, format!("{winner} won a war against {loser}"))
                    .await
            }
            WarOutcome::Draw { attacker: a, defender: d } => {
                self.publish_war_log(&attacker, format!("A war between {a} and {d} resulted in a draw"))
                    .await
            }
        }
    }
}
