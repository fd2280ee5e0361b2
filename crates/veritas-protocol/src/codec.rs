//! Codec trait and implementations for serializing cross-tab messages.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The cross-tab channel only moves bytes; the synchronizer picks a codec
//! to turn [`SyncMessage`](crate::SyncMessage) values into those bytes.
//!
//! Currently we provide [`JsonCodec`], which matches what browser tabs
//! post on a `BroadcastChannel` and is easy to inspect in DevTools.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because the codec lives inside the
/// synchronizer task for the whole lifetime of a tab.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use veritas_protocol::{Codec, JsonCodec, SyncMessage};
///
/// let codec = JsonCodec;
/// let msg = SyncMessage::signed_out();
///
/// let bytes = codec.encode(&msg).unwrap();
/// assert_eq!(bytes, br#"{"type":"SESSION_UPDATED","session":null}"#);
///
/// let decoded: SyncMessage = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, msg);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Session, SessionUser, SyncMessage, UserId};

    fn session() -> Session {
        Session {
            access_token: "at".into(),
            refresh_token: "rt".into(),
            expires_at: 1_700_000_000,
            user: SessionUser {
                id: UserId::new("u-1"),
                email: Some("ada@example.com".into()),
                email_confirmed_at: None,
            },
        }
    }

    #[test]
    fn test_decode_garbage_returns_decode_error() {
        let result: Result<SyncMessage, _> = JsonCodec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_unknown_message_type_fails() {
        let result: Result<SyncMessage, _> =
            JsonCodec.decode(br#"{"type":"SOMETHING_ELSE","session":null}"#);
        assert!(result.is_err(), "unknown tags must not decode");
    }

    #[test]
    fn test_encode_session_update_uses_browser_field_names() {
        let bytes = JsonCodec
            .encode(&SyncMessage::session_updated(session()))
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["type"], "SESSION_UPDATED");
        assert_eq!(value["session"]["expires_at"], 1_700_000_000);
        assert_eq!(value["session"]["user"]["id"], "u-1");
    }

    #[test]
    fn test_decode_peer_payload_preserves_session() {
        let original = SyncMessage::session_updated(session());
        let bytes = JsonCodec.encode(&original).unwrap();
        let decoded: SyncMessage = JsonCodec.decode(&bytes).unwrap();
        assert_eq!(decoded, original);
    }
}
