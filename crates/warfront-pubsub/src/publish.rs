//! Publish path: encode a payload with a call-site codec and hand it to the
//! broker session.

use serde::Serialize;
use warfront_protocol::Codec;

use crate::{BrokerConnection, BrokerSession, PubsubError};

/// A typed publisher bound to one broker session.
///
/// Cheap to share behind an `Arc`; handlers that need to publish side
/// effects get their own `Publisher` on a session separate from the one
/// their delivery loop consumes on.
pub struct Publisher<S> {
    session: S,
}

impl<S: BrokerSession> Publisher<S> {
    /// Wraps an existing session.
    pub fn new(session: S) -> Self {
        Self { session }
    }

    /// Opens a fresh session over `conn` and wraps it.
    pub async fn open<C>(conn: &C) -> Result<Self, PubsubError>
    where
        C: BrokerConnection<Session = S>,
    {
        let session = conn.open_session().await.map_err(PubsubError::SessionOpen)?;
        Ok(Self::new(session))
    }

    /// Encodes `value` with `codec`, stamps the codec's content type, and
    /// publishes to `exchange` under `routing_key`.
    ///
    /// The publish is non-mandatory: an unroutable message is silently
    /// dropped by the broker, so routing correctness is the caller's
    /// responsibility via correct exchange/key choice. No retry is
    /// performed here; the caller decides what to do with an error.
    ///
    /// # Errors
    /// [`PubsubError::Codec`] if encoding fails, [`PubsubError::Publish`]
    /// if the transport write fails.
    pub async fn publish<C: Codec, T: Serialize>(
        &self,
        codec: &C,
        exchange: &str,
        routing_key: &str,
        value: &T,
    ) -> Result<(), PubsubError> {
        let body = codec.encode(value)?;
        self.session
            .publish(exchange, routing_key, codec.content_type(), body)
            .await
            .map_err(|source| PubsubError::Publish {
                exchange: exchange.to_string(),
                routing_key: routing_key.to_string(),
                source,
            })?;
        tracing::trace!(exchange, routing_key, content_type = codec.content_type(), "published");
        Ok(())
    }

    /// The underlying session.
    pub fn session(&self) -> &S {
        &self.session
    }
}
