//! Error types for the messaging core.
//!
//! Two layers: [`BrokerError`] is what a backend (AMQP or in-memory) reports
//! for a single broker operation; [`PubsubError`] wraps it with the operation
//! and queue/exchange that failed, which is what callers actually see.

use warfront_protocol::ProtocolError;

/// A failure reported by a broker backend.
///
/// Backends map their native errors into these variants at the edge, the
/// same way the transport layer keeps its wire library out of its public
/// error type.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// The connection or session is no longer usable.
    #[error("broker connection closed")]
    ConnectionClosed,

    /// The broker refused the operation (bad arguments, missing entity,
    /// exclusive-queue conflict, ...).
    #[error("broker refused operation: {0}")]
    Refused(String),

    /// A transport-level I/O failure.
    #[error("broker i/o failure: {0}")]
    Io(String),
}

/// Errors surfaced by the publish, provisioning, and subscribe entry points.
///
/// Every variant names the operation that failed; topology errors are fatal
/// to the call that triggered them and the caller is expected to abort
/// startup rather than continue with half-provisioned state.
#[derive(Debug, thiserror::Error)]
pub enum PubsubError {
    /// Opening a session (channel) over the shared connection failed.
    #[error("opening broker session: {0}")]
    SessionOpen(#[source] BrokerError),

    /// Declaring a queue failed.
    #[error("declaring queue {queue}: {source}")]
    QueueDeclare {
        /// The queue that failed to declare.
        queue: String,
        /// The underlying broker failure.
        source: BrokerError,
    },

    /// Binding a queue to an exchange failed.
    #[error("binding queue {queue} to exchange {exchange}: {source}")]
    QueueBind {
        /// The queue that failed to bind.
        queue: String,
        /// The exchange it was being bound to.
        exchange: String,
        /// The underlying broker failure.
        source: BrokerError,
    },

    /// Opening the consumption stream on a queue failed.
    #[error("starting consumer on queue {queue}: {source}")]
    Consume {
        /// The queue that failed to start consuming.
        queue: String,
        /// The underlying broker failure.
        source: BrokerError,
    },

    /// The transport write for a publish failed.
    #[error("publishing to exchange {exchange} with key {routing_key}: {source}")]
    Publish {
        /// The target exchange.
        exchange: String,
        /// The routing key the message was published under.
        routing_key: String,
        /// The underlying broker failure.
        source: BrokerError,
    },

    /// Encoding a payload failed before it ever reached the broker.
    #[error(transparent)]
    Codec(#[from] ProtocolError),
}
