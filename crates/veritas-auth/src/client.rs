//! The auth client capability.
//!
//! Veritas talks to its identity provider (Supabase in production)
//! only through the [`AuthClient`] trait, so the synchronizer can be
//! exercised against a scripted fake in tests.

use tokio::sync::broadcast;
use veritas_protocol::Session;

use crate::AuthError;

/// A session change reported by the auth client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A user signed in.
    SignedIn(Session),
    /// The provider renewed the session on its own.
    TokenRefreshed(Session),
    /// The user signed out, here or in the provider.
    SignedOut,
}

impl AuthEvent {
    /// The session carried by this event, if any.
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::SignedIn(session) | Self::TokenRefreshed(session) => Some(session),
            Self::SignedOut => None,
        }
    }
}

/// Session operations offered by the identity provider.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` because the synchronizer shares the client
/// with the task that performs the renewal network call.
///
/// # Example
///
/// ```rust
/// use tokio::sync::broadcast;
/// use veritas_auth::{AuthClient, AuthError, AuthEvent};
/// use veritas_protocol::Session;
///
/// /// A client for an anonymous visitor: never has a session.
/// struct Anonymous {
///     events: broadcast::Sender<AuthEvent>,
/// }
///
/// impl AuthClient for Anonymous {
///     fn current_session(&self) -> Option<Session> {
///         None
///     }
///
///     async fn refresh_session(&self) -> Result<Session, AuthError> {
///         Err(AuthError::from_status(401, "no refresh token", None))
///     }
///
///     fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
///         self.events.subscribe()
///     }
///
///     async fn sign_out(&self) -> Result<(), AuthError> {
///         Ok(())
///     }
/// }
/// ```
pub trait AuthClient: Send + Sync + 'static {
    /// Non-blocking read of the provider's cached session.
    fn current_session(&self) -> Option<Session>;

    /// Renews the session over the network.
    ///
    /// # Errors
    /// Returns an [`AuthError`] describing why the provider refused or
    /// why the call never reached it.
    fn refresh_session(
        &self,
    ) -> impl std::future::Future<Output = Result<Session, AuthError>> + Send;

    /// Subscribes to session changes. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;

    /// Ends the session with the provider.
    ///
    /// # Errors
    /// Returns an [`AuthError`] if the provider could not be reached.
    fn sign_out(&self) -> impl std::future::Future<Output = Result<(), AuthError>> + Send;
}
