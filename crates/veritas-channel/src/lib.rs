//! Cross-tab channel abstraction layer for Veritas.
//!
//! Provides the [`ChannelOpener`] and [`CrossTabChannel`] traits that
//! abstract over a same-origin broadcast primitive, and the
//! [`ConnectivityObserver`] trait that abstracts over the runtime's
//! `online` / `offline` / `focus` events.
//!
//! Delivery on a channel is asynchronous, unordered and at-most-once.
//! Callers must tolerate lost messages.
//!
//! # Feature Flags
//!
//! - `local` (default): in-process [`BroadcastHub`] built on
//!   `tokio::sync::broadcast`, for tests, demos and multi-window hosts
//!   that share one process.

#![allow(async_fn_in_trait)]

mod connectivity;
mod error;
#[cfg(feature = "local")]
mod local;

pub use connectivity::{ConnectivityEvent, ConnectivityMonitor, ConnectivityObserver};
pub use error::ChannelError;
#[cfg(feature = "local")]
pub use local::{BroadcastHub, HubChannel};

use std::fmt;

/// Opaque identifier for one open channel endpoint (one per tab).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(u64);

impl ChannelId {
    /// Creates a new `ChannelId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

/// Opens named channels to same-origin peers.
pub trait ChannelOpener: Send + Sync + 'static {
    /// The channel type produced by this opener.
    type Channel: CrossTabChannel;

    /// Opens (or joins) the channel called `name`.
    ///
    /// Returns `None` when the runtime has no broadcast support; callers
    /// then run without cross-tab synchronization.
    fn open(&self, name: &str) -> Option<Self::Channel>;
}

/// One tab's endpoint on a named broadcast channel.
///
/// A message posted on an endpoint reaches every *other* endpoint with
/// the same name; it is never echoed back to its sender.
pub trait CrossTabChannel: Send + 'static {
    /// Posts a payload to every peer.
    ///
    /// # Errors
    /// Returns [`ChannelError::Closed`] once the endpoint was closed.
    fn post_message(&self, payload: &[u8]) -> Result<(), ChannelError>;

    /// Receives the next payload posted by a peer.
    ///
    /// Returns `None` when no more messages can ever arrive (closed
    /// endpoint or vanished hub).
    fn recv(&mut self) -> impl std::future::Future<Output = Option<Vec<u8>>> + Send;

    /// Closes the endpoint. Further posts fail.
    fn close(&mut self) -> Result<(), ChannelError>;

    /// Returns the unique identifier for this endpoint.
    fn id(&self) -> ChannelId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_id_new_and_into_inner() {
        let id = ChannelId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_channel_id_display() {
        assert_eq!(ChannelId::new(7).to_string(), "tab-7");
    }
}
