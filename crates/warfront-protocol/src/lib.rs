//! Wire contract for Warfront.
//!
//! This crate defines what travels over the broker and how:
//!
//! - **Codecs** ([`Codec`] trait, [`JsonCodec`], [`BincodeCodec`]) — how
//!   payloads are converted to/from bytes, and the content-type marker each
//!   codec stamps on a message.
//! - **Routing** ([`routing`]) — exchange names, routing-key conventions,
//!   and the payload types shared by every process (pause state, game logs).
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding or
//!   decoding.
//!
//! The messaging core (`warfront-pubsub`) is generic over this crate's
//! [`Codec`] trait; it never inspects payload bytes itself. Publisher and
//! subscriber agree out-of-band on which codec a given queue uses — the
//! content-type marker is informational, not a dispatch mechanism.

mod codec;
mod error;
pub mod routing;

pub use codec::{BincodeCodec, Codec, JsonCodec};
pub use error::ProtocolError;
