//! # Veritas
//!
//! Session renewal and cross-tab synchronization for web clients.
//!
//! Every tab runs one [`SessionSynchronizer`](veritas_sync::SessionSynchronizer).
//! It renews the session a minute before it expires, retries transient
//! failures with jittered exponential backoff, and keeps all tabs of the
//! same origin on the same session through a broadcast channel. When a
//! session can't be saved the user is sent back to sign in with a reason
//! the sign-in page can show.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use veritas::prelude::*;
//!
//! // Implement AuthClient and Navigator for your platform, then:
//! // let sync = SessionSynchronizer::builder(SyncConfig::default())
//! //     .spawn(auth, BroadcastHub::new(), ConnectivityMonitor::default(), navigator);
//! // let view = sync.view();
//! // ...
//! // sync.cleanup();
//! ```

mod error;
pub mod telemetry;

pub use error::VeritasError;
pub use telemetry::init_tracing;

pub use veritas_auth as auth;
pub use veritas_backoff as backoff;
pub use veritas_channel as channel;
pub use veritas_protocol as protocol;
pub use veritas_sync as sync;

/// Everything needed to wire a synchronizer into a tab.
pub mod prelude {
    pub use crate::{VeritasError, init_tracing};
    pub use veritas_auth::{
        AuthClient, AuthError, AuthEvent, Banner, Navigator, RedirectReason, SignInRedirect,
    };
    pub use veritas_backoff::RetryPolicy;
    pub use veritas_channel::{
        BroadcastHub, ChannelOpener, ConnectivityEvent, ConnectivityMonitor, ConnectivityObserver,
        CrossTabChannel,
    };
    pub use veritas_protocol::{Session, SessionUser, SyncMessage, UserId};
    pub use veritas_sync::{
        RefreshOutcome, SessionSynchronizer, SessionView, SyncConfig, SyncError, SyncHandle,
        SyncState,
    };
}
