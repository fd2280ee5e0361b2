//! Core types: the session bundle and the cross-tab envelope.
//!
//! A [`Session`] is owned by the auth provider. Veritas only ever holds a
//! cached copy, and it never edits one in place; a renewal produces a
//! brand new `Session` that replaces the old one wholesale.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The auth provider's identifier for a signed-in user.
///
/// Newtype over the provider's opaque string id so it can't be confused
/// with tokens. `#[serde(transparent)]` keeps it a bare string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a `UserId` from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The user a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    /// Seconds since epoch at which the email address was confirmed.
    /// `None` while the user hasn't clicked the verification link.
    #[serde(default)]
    pub email_confirmed_at: Option<i64>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// An authentication credential bundle with an expiry instant.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry instant in seconds since the Unix epoch.
    pub expires_at: i64,
    pub user: SessionUser,
}

impl Session {
    /// The id of the user this session belongs to.
    pub fn user_id(&self) -> &UserId {
        &self.user.id
    }

    /// Expiry instant in milliseconds since the Unix epoch.
    pub fn expires_at_millis(&self) -> i64 {
        self.expires_at.saturating_mul(1000)
    }

    /// Returns `true` once the user's email address has been confirmed.
    pub fn is_verified(&self) -> bool {
        self.user.email_confirmed_at.is_some()
    }

    /// Checks the invariants a session received from a peer must satisfy.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidMessage`] for empty tokens or a
    /// non-positive expiry.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.access_token.is_empty() {
            return Err(ProtocolError::InvalidMessage("empty access token".into()));
        }
        if self.expires_at <= 0 {
            return Err(ProtocolError::InvalidMessage(format!(
                "non-positive expires_at {}",
                self.expires_at
            )));
        }
        Ok(())
    }
}

/// Tokens stay out of logs: `Debug` prints only the identity and expiry.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user.id)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// SyncMessage
// ---------------------------------------------------------------------------

/// A message exchanged between tabs of the same origin.
///
/// Serialized as `{"type":"SESSION_UPDATED","session":...}` so that it is
/// byte-compatible with what a browser tab posts on its `BroadcastChannel`.
/// A `null` session means the peer signed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncMessage {
    SessionUpdated { session: Option<Session> },
}

impl SyncMessage {
    /// A peer renewed (or adopted) this session.
    pub fn session_updated(session: Session) -> Self {
        Self::SessionUpdated {
            session: Some(session),
        }
    }

    /// A peer signed out.
    pub fn signed_out() -> Self {
        Self::SessionUpdated { session: None }
    }

    /// The session carried by this message, if any.
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::SessionUpdated { session } => session.as_ref(),
        }
    }

    /// Consumes the message and returns its session.
    pub fn into_session(self) -> Option<Session> {
        match self {
            Self::SessionUpdated { session } => session,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_at: i64) -> Session {
        Session {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            expires_at,
            user: SessionUser {
                id: UserId::new("user-7"),
                email: None,
                email_confirmed_at: Some(1_600_000_000),
            },
        }
    }

    #[test]
    fn test_user_id_display_is_raw_string() {
        assert_eq!(UserId::new("abc").to_string(), "abc");
    }

    #[test]
    fn test_expires_at_millis_scales_seconds() {
        assert_eq!(session(12).expires_at_millis(), 12_000);
    }

    #[test]
    fn test_is_verified_follows_email_confirmation() {
        let mut s = session(10);
        assert!(s.is_verified());
        s.user.email_confirmed_at = None;
        assert!(!s.is_verified());
    }

    #[test]
    fn test_debug_hides_tokens() {
        let printed = format!("{:?}", session(10));
        assert!(printed.contains("user-7"));
        assert!(!printed.contains("access"));
        assert!(!printed.contains("refresh"));
    }

    #[test]
    fn test_validate_rejects_empty_token_and_bad_expiry() {
        let mut s = session(10);
        assert!(s.validate().is_ok());

        s.access_token.clear();
        assert!(matches!(s.validate(), Err(ProtocolError::InvalidMessage(_))));

        let s = session(0);
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_signed_out_message_carries_no_session() {
        let msg = SyncMessage::signed_out();
        assert!(msg.session().is_none());
        assert_eq!(
            SyncMessage::session_updated(session(5)).into_session(),
            Some(session(5))
        );
    }
}
