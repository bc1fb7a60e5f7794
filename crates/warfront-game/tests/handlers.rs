//! Handler → disposition mapping, exercised against the in-memory broker.

use std::sync::Arc;

use tokio::sync::Mutex;
use warfront_game::{
    ArmyMove, GameState, MoveHandler, PauseHandler, Player, RecognitionOfWar, Territory, Unit,
    UnitRank, WarHandler,
};
use warfront_protocol::routing::{EXCHANGE_DEAD_LETTER, EXCHANGE_TOPIC, GameLog, PlayingState};
use warfront_protocol::{BincodeCodec, Codec, JsonCodec};
use warfront_pubsub::memory::{MemoryBroker, MemorySession};
use warfront_pubsub::{
    BrokerConnection, BrokerSession, Disposition, MessageHandler, Publisher, QueueProfile,
};

fn shared_state(gs: GameState) -> Arc<Mutex<GameState>> {
    Arc::new(Mutex::new(gs))
}

async fn publisher(broker: &MemoryBroker) -> Arc<Publisher<MemorySession>> {
    Arc::new(Publisher::open(broker).await.unwrap())
}

/// Declares a consumerless probe queue so published side effects can be
/// inspected through the broker's pending buffer.
async fn probe_queue(broker: &MemoryBroker, name: &str, exchange: &str, pattern: &str) {
    let session = broker.open_session().await.unwrap();
    let profile = QueueProfile {
        durable: true,
        auto_delete: false,
        exclusive: false,
    };
    session
        .declare_queue(name, profile, EXCHANGE_DEAD_LETTER)
        .await
        .unwrap();
    session.bind_queue(name, exchange, pattern).await.unwrap();
}

fn enemy(username: &str, rank: UnitRank, location: Territory) -> Player {
    Player {
        username: username.into(),
        units: vec![Unit {
            id: 1,
            rank,
            location,
        }],
    }
}

#[tokio::test]
async fn test_pause_handler_applies_state_and_acks() {
    let state = shared_state(GameState::new("alice"));
    let mut handler = PauseHandler::new(Arc::clone(&state));

    let d = handler.handle(PlayingState { is_paused: true }).await;
    assert_eq!(d, Disposition::Ack);
    assert!(state.lock().await.is_paused());

    let d = handler.handle(PlayingState { is_paused: false }).await;
    assert_eq!(d, Disposition::Ack);
    assert!(!state.lock().await.is_paused());
}

#[tokio::test]
async fn test_move_handler_discards_own_echo() {
    let broker = MemoryBroker::new();
    let state = shared_state(GameState::new("alice"));
    let mut handler = MoveHandler::new(Arc::clone(&state), publisher(&broker).await);

    let echo = ArmyMove {
        player: state.lock().await.player_snapshot(),
        units: vec![],
        to: Territory::Europe,
    };
    assert_eq!(handler.handle(echo).await, Disposition::NackDiscard);
}

#[tokio::test]
async fn test_move_handler_acks_safe_move() {
    let broker = MemoryBroker::new();
    let state = shared_state(GameState::new("alice"));
    let mut handler = MoveHandler::new(Arc::clone(&state), publisher(&broker).await);

    let mv = ArmyMove {
        player: enemy("bob", UnitRank::Infantry, Territory::Asia),
        units: vec![],
        to: Territory::Asia,
    };
    assert_eq!(handler.handle(mv).await, Disposition::Ack);
}

#[tokio::test]
async fn test_move_handler_declares_war_on_clash() {
    let broker = MemoryBroker::new();
    probe_queue(&broker, "war", EXCHANGE_TOPIC, "war.*").await;

    let mut gs = GameState::new("alice");
    gs.command_spawn(Territory::Europe, UnitRank::Infantry).unwrap();
    let state = shared_state(gs);
    let mut handler = MoveHandler::new(Arc::clone(&state), publisher(&broker).await);

    let mv = ArmyMove {
        player: enemy("bob", UnitRank::Cavalry, Territory::Europe),
        units: vec![],
        to: Territory::Europe,
    };
    assert_eq!(handler.handle(mv).await, Disposition::Ack);

    let pending = broker.pending_bodies("war");
    assert_eq!(pending.len(), 1);
    let declaration: RecognitionOfWar = JsonCodec.decode(&pending[0]).unwrap();
    assert_eq!(declaration.attacker.username, "bob");
    assert_eq!(declaration.defender.username, "alice");
}

#[tokio::test]
async fn test_war_handler_requeues_when_not_involved() {
    let broker = MemoryBroker::new();
    probe_queue(&broker, "game_logs", EXCHANGE_TOPIC, "game_logs.*").await;
    let state = shared_state(GameState::new("carol"));
    let mut handler = WarHandler::new(Arc::clone(&state), publisher(&broker).await);

    let rw = RecognitionOfWar {
        attacker: enemy("alice", UnitRank::Infantry, Territory::Asia),
        defender: enemy("bob", UnitRank::Infantry, Territory::Asia),
    };
    assert_eq!(handler.handle(rw).await, Disposition::NackRequeue);
    assert!(broker.pending_bodies("game_logs").is_empty());
}

#[tokio::test]
async fn test_war_handler_discards_empty_armies() {
    let broker = MemoryBroker::new();
    let state = shared_state(GameState::new("bob"));
    let mut handler = WarHandler::new(Arc::clone(&state), publisher(&broker).await);

    let rw = RecognitionOfWar {
        attacker: Player {
            username: "alice".into(),
            units: vec![],
        },
        defender: state.lock().await.player_snapshot(),
    };
    assert_eq!(handler.handle(rw).await, Disposition::NackDiscard);
}

#[tokio::test]
async fn test_war_handler_publishes_result_log() {
    let broker = MemoryBroker::new();
    probe_queue(&broker, "game_logs", EXCHANGE_TOPIC, "game_logs.*").await;

    let mut gs = GameState::new("bob");
    gs.command_spawn(Territory::Asia, UnitRank::Artillery).unwrap();
    let state = shared_state(gs);
    let mut handler = WarHandler::new(Arc::clone(&state), publisher(&broker).await);

    let rw = RecognitionOfWar {
        attacker: enemy("alice", UnitRank::Infantry, Territory::Asia),
        defender: state.lock().await.player_snapshot(),
    };
    assert_eq!(handler.handle(rw).await, Disposition::Ack);

    let pending = broker.pending_bodies("game_logs");
    assert_eq!(pending.len(), 1);
    let log: GameLog = BincodeCodec.decode(&pending[0]).unwrap();
    assert_eq!(log.username, "bob");
    assert_eq!(log.message, "bob won a war against alice");
}
