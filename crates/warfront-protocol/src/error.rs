//! Error types for the wire-contract layer.

/// Errors that can occur while encoding or decoding a payload.
///
/// Both codecs funnel their failures into these two variants so that
/// callers deal with one error type regardless of which codec produced it.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a value into bytes).
    #[error("encode failed: {0}")]
    Encode(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Deserialization failed (turning bytes back into a value).
    ///
    /// Common causes: malformed input, a payload published with the other
    /// codec, or a type mismatch between publisher and subscriber.
    #[error("decode failed: {0}")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),
}
