//! What pages observe about the session.

use veritas_protocol::{Session, UserId};

use crate::SyncState;

/// A snapshot of the tab's session, published after every change.
///
/// Pages subscribe to this instead of talking to the auth client
/// directly; a `None` session after `loading` turned false means the
/// user is signed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    /// Last known session, if any.
    pub session: Option<Session>,
    /// `true` until the initial session read completed.
    pub loading: bool,
    /// Current lifecycle state.
    pub state: SyncState,
    /// Consecutive transient renewal failures so far.
    pub attempt_count: u32,
}

impl SessionView {
    /// The view before the initial session read.
    pub fn loading() -> Self {
        Self {
            session: None,
            loading: true,
            state: SyncState::Unauthenticated,
            attempt_count: 0,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Signed in with a confirmed email address.
    pub fn is_verified(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_verified)
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.session.as_ref().map(Session::user_id)
    }
}

impl Default for SessionView {
    fn default() -> Self {
        Self::loading()
    }
}
