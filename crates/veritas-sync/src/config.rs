//! Synchronizer configuration and state machine.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use veritas_auth::DEFAULT_SIGN_IN_PATH;
use veritas_backoff::{DEFAULT_REFRESH_THRESHOLD, RetryPolicy};

/// Channel name shared by every tab of the same origin.
pub const DEFAULT_CHANNEL_NAME: &str = "veritas_session_sync";

// ---------------------------------------------------------------------------
// SyncConfig
// ---------------------------------------------------------------------------

/// Configuration for a session synchronizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// How long before expiry a session is renewed.
    pub refresh_threshold: Duration,

    /// Retry budget and backoff for failed renewals.
    pub retry: RetryPolicy,

    /// Name of the cross-tab channel. Tabs only synchronize with tabs
    /// using the same name.
    pub channel_name: String,

    /// Sign-in entry point used for fatal-failure redirects.
    pub sign_in_path: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            refresh_threshold: DEFAULT_REFRESH_THRESHOLD,
            retry: RetryPolicy::default(),
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
        }
    }
}

impl SyncConfig {
    /// Clamp and fix any out-of-range values so the config is safe to use.
    ///
    /// Called automatically when the synchronizer is spawned. Rules:
    /// - the retry policy is validated ([`RetryPolicy::validated`]);
    /// - empty `channel_name` / `sign_in_path` fall back to the defaults.
    pub fn validated(mut self) -> Self {
        self.retry = self.retry.validated();
        if self.channel_name.trim().is_empty() {
            tracing::warn!("empty channel_name, using {DEFAULT_CHANNEL_NAME}");
            self.channel_name = DEFAULT_CHANNEL_NAME.to_string();
        }
        if self.sign_in_path.trim().is_empty() {
            tracing::warn!("empty sign_in_path, using {DEFAULT_SIGN_IN_PATH}");
            self.sign_in_path = DEFAULT_SIGN_IN_PATH.to_string();
        }
        self
    }
}

// ---------------------------------------------------------------------------
// SyncState
// ---------------------------------------------------------------------------

/// Where a tab's session lifecycle currently is.
///
/// ```text
///                 sign-in            timer / focus / online
/// Unauthenticated ───────→ Scheduled ─────────────────────→ Refreshing
///        ↑                     ↑                                 │
///        │                     └────────── success ──────────────┤
///        │                                                       │ recoverable failure
///        │                          backoff elapsed              ↓
///        │                     Refreshing ←──────────────────  Backoff
///        │
///        └── sign-out / fatal failure (from any state)
///
/// any state ──offline──→ Offline ──online──→ Refreshing
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncState {
    /// No session is cached.
    Unauthenticated,
    /// A renewal timer is armed and nothing is in flight.
    Scheduled,
    /// A renewal call is in flight.
    Refreshing,
    /// Waiting before retrying a failed renewal.
    Backoff,
    /// Connectivity is lost; no timer is armed.
    Offline,
}

impl SyncState {
    /// Returns `true` if moving to `target` is a transition of the
    /// state machine above.
    ///
    /// Adopting a session (sign-in, a peer's renewal, a provider-side
    /// refresh) re-arms the timer, so `Scheduled` is reachable from
    /// every idle state. An explicit renewal may start from any state
    /// except `Refreshing`, where callers join the call in flight.
    pub fn can_transition_to(self, target: Self) -> bool {
        use SyncState::*;
        match (self, target) {
            (_, Unauthenticated | Offline) => true,
            (Unauthenticated | Scheduled | Backoff, Scheduled) => true,
            (Refreshing, Scheduled | Backoff) => true,
            (Refreshing, Refreshing) => false,
            (_, Refreshing) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "Unauthenticated"),
            Self::Scheduled => write!(f, "Scheduled"),
            Self::Refreshing => write!(f, "Refreshing"),
            Self::Backoff => write!(f, "Backoff"),
            Self::Offline => write!(f, "Offline"),
        }
    }
}
