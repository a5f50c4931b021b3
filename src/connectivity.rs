//! # Connectivity Monitor
//!
//! Bridges the host environment's online/offline signal into a subscription
//! interface. Purely event-driven: the embedder pushes transitions via
//! [`ConnectivityMonitor::set_online`]; nothing here polls or probes the
//! network.

use std::sync::Arc;

use tokio::sync::watch;

/// Current connectivity plus a change stream.
///
/// Cheap to clone; clones share the same underlying state.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    tx: Arc<watch::Sender<bool>>,
}

impl ConnectivityMonitor {
    /// Create a monitor with the given initial state
    pub fn new(initially_online: bool) -> Self {
        let (tx, _rx) = watch::channel(initially_online);
        Self { tx: Arc::new(tx) }
    }

    /// Current connectivity
    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Record a transition pushed by the host environment.
    ///
    /// Subscribers are only woken on an actual change.
    pub fn set_online(&self, online: bool) {
        self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
    }

    /// Subscribe to connectivity transitions
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}
