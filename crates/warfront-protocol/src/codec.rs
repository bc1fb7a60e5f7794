//! Codec trait and implementations for serializing/deserializing payloads.
//!
//! A codec converts between Rust types and raw bytes. The messaging core
//! doesn't care HOW a payload is serialized — it just needs something that
//! implements the [`Codec`] trait. Call sites pick the codec explicitly by
//! passing a [`JsonCodec`] or [`BincodeCodec`] value; the choice is never
//! inferred from the message itself.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because a codec is captured by the long-lived
/// delivery-loop task and may be shared across Tokio worker threads.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed,
    /// truncated, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// The content-type marker stamped on messages encoded by this codec.
    fn content_type(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Structural and self-describing: unknown fields are tolerated on decode,
/// so publisher and subscriber can evolve independently. Human-inspectable
/// in broker tooling at the cost of message size.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(|e| ProtocolError::Encode(e.into()))
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(|e| ProtocolError::Decode(e.into()))
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

// ---------------------------------------------------------------------------
// BincodeCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses bincode.
///
/// Compact binary encoding with no field names on the wire, so the decode
/// side must know the concrete type up front — publisher and subscriber
/// types must match exactly. Used for the high-volume game-log stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl Codec for BincodeCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        bincode::serialize(value).map_err(|e| ProtocolError::Encode(e))
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        bincode::deserialize(data).map_err(|e| ProtocolError::Decode(e))
    }

    fn content_type(&self) -> &'static str {
        "application/bincode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    fn sample() -> Sample {
        Sample {
            name: "alice".into(),
            count: 7,
        }
    }

    #[test]
    fn test_json_round_trip() {
        let codec = JsonCodec;
        let bytes = codec.encode(&sample()).unwrap();
        let back: Sample = codec.decode(&bytes).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_bincode_round_trip() {
        let codec = BincodeCodec;
        let bytes = codec.encode(&sample()).unwrap();
        let back: Sample = codec.decode(&bytes).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_json_tolerates_unknown_fields() {
        let codec = JsonCodec;
        let raw = br#"{"name":"bob","count":3,"extra":"ignored"}"#;
        let back: Sample = codec.decode(raw).unwrap();
        assert_eq!(back.name, "bob");
        assert_eq!(back.count, 3);
    }

    #[test]
    fn test_json_rejects_garbage() {
        let codec = JsonCodec;
        let err = codec.decode::<Sample>(b"not json at all").unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }

    #[test]
    fn test_bincode_rejects_truncated_input() {
        let codec = BincodeCodec;
        let bytes = codec.encode(&sample()).unwrap();
        let err = codec.decode::<Sample>(&bytes[..2]).unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }

    #[test]
    fn test_content_type_markers() {
        assert_eq!(JsonCodec.content_type(), "application/json");
        assert_eq!(BincodeCodec.content_type(), "application/bincode");
    }
}
