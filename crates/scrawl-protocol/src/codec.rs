//! Codec trait and the JSON implementation.
//!
//! The session layer only deals in [`ClientEvent`](crate::ClientEvent) and
//! [`ServerEvent`](crate::ServerEvent) values; the connection handler uses a
//! [`Codec`] to turn them into frames and back. Swapping the wire format
//! means swapping the codec, nothing else.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to bytes and decodes them back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or do
    /// not match the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// Output is UTF-8, so the transport can ship it as WebSocket text frames
/// that browsers hand to `JSON.parse` directly.
///
/// ```rust
/// use scrawl_protocol::{ClientEvent, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let event = ClientEvent::SendMessage { text: "apple".into() };
///
/// let bytes = codec.encode(&event).unwrap();
/// let decoded: ClientEvent = codec.decode(&bytes).unwrap();
/// assert_eq!(event, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientEvent, ServerEvent};

    #[test]
    fn test_decode_client_event_from_text_frame() {
        let frame = br#"{"event":"send_message","data":{"text":"  Apple "}}"#;
        let event: ClientEvent = JsonCodec.decode(frame).unwrap();
        assert_eq!(
            event,
            ClientEvent::SendMessage {
                text: "  Apple ".into()
            }
        );
    }

    #[test]
    fn test_encoded_server_event_is_utf8() {
        let bytes = JsonCodec.encode(&ServerEvent::TimerUpdate { timer: 42 }).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, r#"{"event":"timer_update","data":{"timer":42}}"#);
    }

    #[test]
    fn test_decode_garbage_returns_decode_error() {
        let result: Result<ClientEvent, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
