//! Error types for the protocol layer.
//!
//! Each crate in Veritas defines its own error enum. When you see a
//! `ProtocolError`, the problem is in serialization of a cross-tab
//! message, not in the auth client or the channel itself.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a message into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a message).
    ///
    /// Common causes: a peer tab running a different build, truncated
    /// payloads, or a foreign message posted on the same channel name.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message parsed but violates protocol rules, e.g. a session
    /// with an empty access token.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
