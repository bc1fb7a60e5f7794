//! Topology provisioning: resolve a queue's durability profile, declare it
//! with dead-lettering, and bind it to its exchange.

use warfront_protocol::routing::EXCHANGE_DEAD_LETTER;

use crate::{BrokerConnection, BrokerSession, PubsubError, QueueInfo, QueueProfile};

/// Durability policy for a declared queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueClass {
    /// Survives broker restarts, shared by any consumer. For queues whose
    /// consumption can safely resume later (war recognitions, game logs).
    Durable,
    /// Scoped to one consumer's lifetime: auto-deleting and exclusive to
    /// the declaring session. For per-player notification queues.
    Transient,
}

impl QueueClass {
    /// The (durable, auto_delete, exclusive) triple this class declares with.
    pub fn profile(self) -> QueueProfile {
        match self {
            QueueClass::Durable => QueueProfile {
                durable: true,
                auto_delete: false,
                exclusive: false,
            },
            QueueClass::Transient => QueueProfile {
                durable: false,
                auto_delete: true,
                exclusive: true,
            },
        }
    }
}

/// Opens a session, declares `queue_name` with the profile implied by
/// `class` (dead-lettered into [`EXCHANGE_DEAD_LETTER`]), and binds it to
/// `exchange` under `routing_key`.
///
/// Returns the session together with the declared queue's metadata. Any
/// declare or bind failure aborts provisioning; the caller holds no partial
/// state (the broker reclaims an unbound exclusive queue on session close).
///
/// # Errors
/// [`PubsubError::SessionOpen`], [`PubsubError::QueueDeclare`], or
/// [`PubsubError::QueueBind`] naming the step that failed.
pub async fn declare_and_bind<C: BrokerConnection>(
    conn: &C,
    exchange: &str,
    queue_name: &str,
    routing_key: &str,
    class: QueueClass,
) -> Result<(C::Session, QueueInfo), PubsubError> {
    let session = conn.open_session().await.map_err(PubsubError::SessionOpen)?;

    let info = session
        .declare_queue(queue_name, class.profile(), EXCHANGE_DEAD_LETTER)
        .await
        .map_err(|source| PubsubError::QueueDeclare {
            queue: queue_name.to_string(),
            source,
        })?;

    session
        .bind_queue(queue_name, exchange, routing_key)
        .await
        .map_err(|source| PubsubError::QueueBind {
            queue: queue_name.to_string(),
            exchange: exchange.to_string(),
            source,
        })?;

    tracing::debug!(
        queue = queue_name,
        exchange,
        routing_key,
        class = ?class,
        "queue declared and bound"
    );

    Ok((session, info))
}
