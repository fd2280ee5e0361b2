//! Connectivity and focus events.
//!
//! In a browser these come from `window` listeners. Here the runtime
//! publishes them through a [`ConnectivityObserver`], and tests drive a
//! [`ConnectivityMonitor`] by hand.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;

/// An environment event relevant to session renewal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    /// Network connectivity came back.
    Online,
    /// Network connectivity was lost.
    Offline,
    /// The window regained focus (e.g. a backgrounded tab was reopened).
    Focus,
}

/// Source of connectivity and focus events.
///
/// Each call to [`subscribe`](Self::subscribe) registers one listener;
/// dropping the receiver removes it.
pub trait ConnectivityObserver: Send + Sync + 'static {
    /// Whether the runtime currently believes it is online.
    fn is_online(&self) -> bool;

    /// Registers a listener for future events.
    fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent>;
}

/// A manually driven [`ConnectivityObserver`].
///
/// Cheap to clone; clones share state, so one clone can be handed to the
/// synchronizer while another fires events.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    online: Arc<AtomicBool>,
    tx: broadcast::Sender<ConnectivityEvent>,
}

impl ConnectivityMonitor {
    /// Creates a monitor in the given initial connectivity state.
    pub fn new(online: bool) -> Self {
        let (tx, _) = broadcast::channel(16);
        Self {
            online: Arc::new(AtomicBool::new(online)),
            tx,
        }
    }

    /// Records a connectivity change and notifies listeners.
    ///
    /// Like the browser, nothing fires if the state doesn't change.
    pub fn set_online(&self, online: bool) {
        if self.online.swap(online, Ordering::SeqCst) == online {
            return;
        }
        let event = if online {
            ConnectivityEvent::Online
        } else {
            ConnectivityEvent::Offline
        };
        tracing::debug!(?event, "connectivity changed");
        let _ = self.tx.send(event);
    }

    /// Notifies listeners that the window regained focus.
    pub fn focus(&self) {
        let _ = self.tx.send(ConnectivityEvent::Focus);
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConnectivityObserver for ConnectivityMonitor {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.tx.subscribe()
    }
}
