//! Per-tab session renewal and cross-tab synchronization for Veritas.
//!
//! Each tab runs one synchronizer as an isolated Tokio task (actor model).
//! It renews the session shortly before expiry, retries transient
//! failures with jittered backoff, tells the other tabs about every
//! renewal and sign-out, and sends the user to sign in when the session
//! can't be saved.
//!
//! # Key types
//!
//! - [`SessionSynchronizer`]: builder entry point, spawns the actor
//! - [`SyncHandle`]: refresh, sign out, observe, clean up
//! - [`SessionView`]: what pages render from
//! - [`SyncState`]: lifecycle state machine
//! - [`SyncConfig`]: threshold, retry policy, channel and sign-in path
//! - [`FailureClass`] / [`classify`]: how renewal failures are treated

mod config;
mod error;
mod synchronizer;
mod view;

pub use config::{DEFAULT_CHANNEL_NAME, SyncConfig, SyncState};
pub use error::{FailureClass, SyncError, classify};
pub use synchronizer::{RefreshOutcome, SessionSynchronizer, SessionSynchronizerBuilder, SyncHandle};
pub use view::SessionView;
