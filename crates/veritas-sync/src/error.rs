//! Error types and failure classification for the sync layer.

use std::fmt;
use std::time::Duration;

use veritas_auth::{AuthError, RedirectReason};

/// Errors returned to callers of a [`SyncHandle`](crate::SyncHandle).
///
/// Renewal failures never show up here. They are handled inside the
/// synchronizer and only observable as a [`RefreshOutcome`](crate::RefreshOutcome),
/// a redirect, or a change of the [`SessionView`](crate::SessionView).
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The synchronizer was cleaned up (or all its handles dropped)
    /// before it could answer.
    #[error("session synchronizer has shut down")]
    ShutDown,

    /// The auth client failed to sign out.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// How a failure on the renewal path is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Credentials rejected. Terminal, redirect with `session_expired`.
    AuthRejected,
    /// Server asked us to wait. Retry once after its delay (or the
    /// fallback), outside the retry budget.
    RateLimited { retry_after: Option<Duration> },
    /// Transient failure while online. Exponential backoff, bounded.
    TransientOnline,
    /// Transient failure while offline. Retried on the next `online`,
    /// not counted against the budget.
    TransientOffline,
    /// Too many consecutive transient failures. Terminal, redirect with
    /// `max_retries`.
    RetryBudgetExhausted,
    /// The cross-tab channel failed. Never fatal; the tab goes local-only.
    ChannelUnavailable,
    /// Anything else. Terminal, redirect with `unknown`.
    Unclassified,
}

impl FailureClass {
    /// The redirect reason for terminal classes, `None` for the others.
    pub fn redirect_reason(self) -> Option<RedirectReason> {
        match self {
            Self::AuthRejected => Some(RedirectReason::SessionExpired),
            Self::RetryBudgetExhausted => Some(RedirectReason::MaxRetries),
            Self::Unclassified => Some(RedirectReason::Unknown),
            Self::RateLimited { .. }
            | Self::TransientOnline
            | Self::TransientOffline
            | Self::ChannelUnavailable => None,
        }
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthRejected => write!(f, "AuthRejected"),
            Self::RateLimited { .. } => write!(f, "RateLimited"),
            Self::TransientOnline => write!(f, "TransientOnline"),
            Self::TransientOffline => write!(f, "TransientOffline"),
            Self::RetryBudgetExhausted => write!(f, "RetryBudgetExhausted"),
            Self::ChannelUnavailable => write!(f, "ChannelUnavailable"),
            Self::Unclassified => write!(f, "Unclassified"),
        }
    }
}

/// Classifies a renewal failure given the tab's current connectivity.
///
/// Budget exhaustion is not decided here; the synchronizer promotes
/// `TransientOnline` to `RetryBudgetExhausted` once the attempt count
/// reaches the limit.
pub fn classify(err: &AuthError, online: bool) -> FailureClass {
    match err {
        AuthError::Rejected { .. } => FailureClass::AuthRejected,
        AuthError::RateLimited { .. } => FailureClass::RateLimited {
            retry_after: err.retry_after(),
        },
        _ if err.is_transient() && online => FailureClass::TransientOnline,
        _ if err.is_transient() => FailureClass::TransientOffline,
        _ => FailureClass::Unclassified,
    }
}
