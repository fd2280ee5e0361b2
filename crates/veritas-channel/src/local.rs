//! In-process cross-tab channel built on `tokio::sync::broadcast`.
//!
//! Every [`HubChannel`] opened under the same name on the same
//! [`BroadcastHub`] sees the messages posted by the others. Slow
//! receivers lose messages instead of blocking senders, which matches the
//! at-most-once contract of a browser `BroadcastChannel`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;

use crate::{ChannelError, ChannelId, ChannelOpener, CrossTabChannel};

/// Counter for generating unique endpoint IDs.
static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

/// Messages buffered per channel name before slow receivers start lagging.
const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
struct Frame {
    origin: ChannelId,
    payload: Arc<[u8]>,
}

/// A process-wide registry of named broadcast channels.
///
/// Cheap to clone; clones share the same registry, so hand one clone to
/// each simulated tab.
#[derive(Debug, Clone)]
pub struct BroadcastHub {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<Frame>>>>,
    capacity: usize,
    supported: bool,
}

impl BroadcastHub {
    /// Creates an empty hub.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty hub buffering `capacity` messages per channel.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
            supported: true,
        }
    }

    /// A hub standing in for a runtime without broadcast support:
    /// every [`open`](ChannelOpener::open) returns `None`.
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// Number of endpoints currently subscribed to `name`.
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map_or(0, broadcast::Sender::receiver_count)
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelOpener for BroadcastHub {
    type Channel = HubChannel;

    fn open(&self, name: &str) -> Option<HubChannel> {
        if !self.supported {
            tracing::debug!(name, "broadcast unsupported, not opening channel");
            return None;
        }

        let tx = self
            .channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone();
        let rx = tx.subscribe();
        let id = ChannelId::new(NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, name, "opened cross-tab channel");

        Some(HubChannel {
            id,
            name: name.to_string(),
            tx,
            rx: Some(rx),
        })
    }
}

/// One endpoint on a [`BroadcastHub`] channel.
#[derive(Debug)]
pub struct HubChannel {
    id: ChannelId,
    name: String,
    tx: broadcast::Sender<Frame>,
    /// `None` once closed.
    rx: Option<broadcast::Receiver<Frame>>,
}

impl HubChannel {
    /// The channel name this endpoint was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether [`close`](CrossTabChannel::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.rx.is_none()
    }
}

impl CrossTabChannel for HubChannel {
    fn post_message(&self, payload: &[u8]) -> Result<(), ChannelError> {
        if self.is_closed() {
            return Err(ChannelError::Closed(self.name.clone()));
        }
        let frame = Frame {
            origin: self.id,
            payload: Arc::from(payload),
        };
        // An `Err` here only means nobody else is listening right now.
        let _ = self.tx.send(frame);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Vec<u8>> {
        let id = self.id;
        let rx = self.rx.as_mut()?;
        loop {
            match rx.recv().await {
                Ok(frame) if frame.origin == id => continue,
                Ok(frame) => return Some(frame.payload.to_vec()),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(%id, skipped, "cross-tab receiver lagged, messages dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    fn close(&mut self) -> Result<(), ChannelError> {
        if self.rx.take().is_some() {
            tracing::debug!(id = %self.id, name = %self.name, "closed cross-tab channel");
        }
        Ok(())
    }

    fn id(&self) -> ChannelId {
        self.id
    }
}
