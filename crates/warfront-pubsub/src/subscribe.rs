//! Subscribe path: per-queue delivery loop mapping handler dispositions to
//! acknowledgment primitives.
//!
//! Each [`subscribe`] call provisions its topology and opens its consumer
//! synchronously — setup failures surface before any task starts — then
//! spawns exactly one long-lived Tokio task for the queue. The task is an
//! actor of sorts: it owns its session and consumer, shares no state, and
//! talks to the rest of the process only through the handler's side effects.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use warfront_protocol::Codec;

use crate::{
    BrokerConnection, BrokerConsumer, BrokerDelivery, BrokerSession, Disposition, PubsubError,
    QueueClass, declare_and_bind,
};

/// A typed message handler invoked once per delivery.
///
/// Returning [`Disposition::Ack`] removes the message, `NackRequeue` puts it
/// back for redelivery, `NackDiscard` dead-letters it. Handlers run to
/// completion before the loop fetches the next delivery, so handler latency
/// directly bounds that queue's throughput — deliberate backpressure.
#[async_trait]
pub trait MessageHandler<T: Send + 'static>: Send + 'static {
    /// Processes one decoded payload and decides its fate.
    async fn handle(&mut self, payload: T) -> Disposition;
}

/// Handle to a running delivery loop.
///
/// Shutting down (or dropping) the handle terminates the loop
/// deterministically; in-flight unacknowledged deliveries return to the
/// broker for redelivery elsewhere.
pub struct Subscription {
    queue: String,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Subscription {
    /// The queue this subscription consumes.
    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Signals the delivery loop to stop and waits for it to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

/// Provisions topology for `queue_name`, opens a manual-ack consumer, and
/// spawns the delivery loop.
///
/// Returns once the consumer stream is established; the loop then runs
/// until the stream closes or the returned [`Subscription`] is shut down.
/// Errors inside the running loop (decode failures, ack failures) are
/// logged, never propagated — by then this call has already returned.
///
/// # Errors
/// Topology errors from [`declare_and_bind`], or [`PubsubError::Consume`]
/// if the stream cannot be opened. In either case no task is spawned.
pub async fn subscribe<Conn, Cod, T, H>(
    conn: &Conn,
    codec: Cod,
    exchange: &str,
    queue_name: &str,
    routing_key: &str,
    class: QueueClass,
    handler: H,
) -> Result<Subscription, PubsubError>
where
    Conn: BrokerConnection,
    Cod: Codec,
    T: DeserializeOwned + Send + 'static,
    H: MessageHandler<T>,
{
    let (session, _info) = declare_and_bind(conn, exchange, queue_name, routing_key, class).await?;

    let consumer = session
        .consume(queue_name)
        .await
        .map_err(|source| PubsubError::Consume {
            queue: queue_name.to_string(),
            source,
        })?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let queue = queue_name.to_string();
    let task = tokio::spawn(delivery_loop(
        session,
        consumer,
        codec,
        handler,
        queue.clone(),
        shutdown_rx,
    ));

    Ok(Subscription {
        queue,
        shutdown: shutdown_tx,
        task,
    })
}

/// The per-queue consumption loop: decode, handle, resolve — sequentially.
async fn delivery_loop<S, Cod, T, H>(
    session: S,
    mut consumer: S::Consumer,
    codec: Cod,
    mut handler: H,
    queue: String,
    mut shutdown: watch::Receiver<bool>,
) where
    S: BrokerSession,
    Cod: Codec,
    T: DeserializeOwned + Send + 'static,
    H: MessageHandler<T>,
{
    loop {
        let delivery = tokio::select! {
            // Either an explicit shutdown or the handle being dropped ends
            // the loop; both close the owned session with it.
            _ = shutdown.changed() => {
                tracing::debug!(%queue, "subscription shut down");
                break;
            }
            next = consumer.next_delivery() => match next {
                Some(d) => d,
                None => {
                    tracing::info!(%queue, "delivery stream closed");
                    break;
                }
            },
        };

        if let Some(ct) = delivery.content_type() {
            if ct != codec.content_type() {
                tracing::warn!(
                    %queue,
                    content_type = ct,
                    expected = codec.content_type(),
                    "delivery content-type differs from subscription codec"
                );
            }
        }

        // A payload that fails to decode never reaches the handler: domain
        // logic must not run on a zero-valued or half-parsed message. The
        // delivery is dead-lettered instead.
        let payload: T = match codec.decode(delivery.body()) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(%queue, error = %e, "undecodable delivery, discarding");
                if let Err(e) = delivery.resolve(Disposition::NackDiscard).await {
                    tracing::warn!(%queue, error = %e, "failed to discard undecodable delivery");
                }
                continue;
            }
        };

        let disposition = handler.handle(payload).await;
        tracing::debug!(%queue, %disposition, "delivery handled");

        // An acknowledgment failure is logged, not retried: the broker has
        // already made its delivery decision independently of whether this
        // call reached it.
        if let Err(e) = delivery.resolve(disposition).await {
            tracing::warn!(%queue, %disposition, error = %e, "failed to resolve delivery");
        }
    }

    drop(session);
}
