//! Broker seam: the trait surface the messaging core is written against.
//!
//! Everything above this module (topology, publish, subscribe) is generic
//! over these traits, so the real AMQP backend and the in-memory test broker
//! are interchangeable. The shape mirrors a transport abstraction: a
//! connection produces sessions, a session produces consumers, a consumer
//! yields deliveries, and `None` from a consumer means the stream closed.

use std::future::Future;

use crate::{BrokerError, Disposition};

/// The (durable, auto_delete, exclusive) triple a queue is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueProfile {
    /// Queue survives a broker restart.
    pub durable: bool,
    /// Queue is deleted when its last consumer goes away.
    pub auto_delete: bool,
    /// Queue is private to the declaring session.
    pub exclusive: bool,
}

/// Metadata returned by a queue declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueInfo {
    /// The declared queue's name.
    pub name: String,
    /// Messages waiting in the queue at declare time.
    pub message_count: u32,
    /// Consumers attached to the queue at declare time.
    pub consumer_count: u32,
}

/// A process-wide broker connection, safe for concurrent session creation.
///
/// Opened once at startup and closed once on shutdown; each publisher and
/// each subscription opens its own session over it, so in-flight operations
/// on different sessions never contend.
pub trait BrokerConnection: Send + Sync + 'static {
    /// The session type produced by this connection.
    type Session: BrokerSession;

    /// Opens a new logical session (an AMQP channel) over this connection.
    ///
    /// Futures on this seam carry a `Send` bound because the delivery loop
    /// runs them inside a spawned task while generic over the backend.
    fn open_session(&self) -> impl Future<Output = Result<Self::Session, BrokerError>> + Send;
}

/// One logical session: the unit of broker-side operations.
///
/// Sessions are not shared between writers without external
/// synchronization; the domain layer opens one session per writer role.
pub trait BrokerSession: Send + Sync + 'static {
    /// The consumer type produced by [`consume`](Self::consume).
    type Consumer: BrokerConsumer;

    /// Declares `name` with the given profile, attaching
    /// `x-dead-letter-exchange = dead_letter_exchange` so rejected messages
    /// stay observable.
    fn declare_queue(
        &self,
        name: &str,
        profile: QueueProfile,
        dead_letter_exchange: &str,
    ) -> impl Future<Output = Result<QueueInfo, BrokerError>> + Send;

    /// Binds `queue` to `exchange` under `routing_key`.
    fn bind_queue(
        &self,
        queue: &str,
        exchange: &str,
        routing_key: &str,
    ) -> impl Future<Output = Result<(), BrokerError>> + Send;

    /// Publishes `body` to `exchange` under `routing_key`.
    ///
    /// Non-mandatory, non-immediate: the broker may silently drop an
    /// unroutable message. Resolves once the write is accepted at the
    /// transport level.
    fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<(), BrokerError>> + Send;

    /// Opens a manual-acknowledgment consumption stream on `queue`.
    fn consume(&self, queue: &str) -> impl Future<Output = Result<Self::Consumer, BrokerError>> + Send;
}

/// A manual-ack consumption stream over one queue.
pub trait BrokerConsumer: Send + 'static {
    /// The delivery type this consumer yields.
    type Delivery: BrokerDelivery;

    /// Waits for the next delivery.
    ///
    /// Returns `None` when the stream is closed by the broker or by session
    /// teardown; the delivery loop treats that as its termination signal.
    fn next_delivery(&mut self) -> impl Future<Output = Option<Self::Delivery>> + Send;
}

/// One inbound message plus its one-shot acknowledgment handle.
///
/// Must be resolved exactly once; [`resolve`](Self::resolve) consumes the
/// delivery so a double acknowledgment is unrepresentable.
pub trait BrokerDelivery: Send + 'static {
    /// The opaque payload bytes.
    fn body(&self) -> &[u8];

    /// The content-type marker the message was published with, if any.
    fn content_type(&self) -> Option<&str>;

    /// Resolves the delivery with exactly one acknowledgment primitive:
    /// ack, nack-with-requeue, or nack-without-requeue (dead-letter).
    fn resolve(self, disposition: Disposition) -> impl Future<Output = Result<(), BrokerError>> + Send;
}
