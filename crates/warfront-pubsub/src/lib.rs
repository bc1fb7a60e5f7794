//! Typed publish/subscribe core for Warfront.
//!
//! This crate turns a raw AMQP-style broker into a typed, acknowledgment-
//! driven messaging substrate:
//!
//! - **Broker seam** ([`BrokerConnection`] and friends) — the small trait
//!   surface everything else is written against. Backends: [`amqp`] (lapin,
//!   the real broker) and [`memory`] (in-process, for tests and offline use).
//! - **Topology** ([`declare_and_bind`], [`QueueClass`]) — declare a queue
//!   with a policy-selected durability profile, dead-letter it, bind it.
//! - **Publish path** ([`Publisher`]) — encode with a call-site codec, stamp
//!   the content type, hand off to the session. No retries.
//! - **Delivery loop** ([`subscribe`], [`MessageHandler`]) — one task per
//!   queue that decodes each delivery, invokes the handler, and maps the
//!   returned [`Disposition`] to exactly one acknowledgment primitive.
//!
//! # Delivery semantics
//!
//! At-least-once. A handler that returns [`Disposition::NackRequeue`] sees
//! the message again; a discarded message is routed to the dead-letter
//! exchange rather than dropped. Processing is sequential per queue — the
//! loop never fetches the next delivery until the previous one is resolved,
//! so a slow handler throttles its own queue and nothing else.

#[cfg(feature = "amqp")]
pub mod amqp;
mod broker;
mod disposition;
mod error;
pub mod memory;
mod publish;
mod subscribe;
mod topology;

pub use broker::{
    BrokerConnection, BrokerConsumer, BrokerDelivery, BrokerSession, QueueInfo, QueueProfile,
};
pub use disposition::Disposition;
pub use error::{BrokerError, PubsubError};
pub use publish::Publisher;
pub use subscribe::{MessageHandler, Subscription, subscribe};
pub use topology::{QueueClass, declare_and_bind};
