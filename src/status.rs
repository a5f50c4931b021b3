//! # Sync Status Surface
//!
//! The observation contract consumed by UI layers: current connectivity,
//! pending-mutation count, whether a replay pass is running, the last
//! successful sync time, and a clearable error string. UI code reads the
//! snapshot or subscribes to the change stream; it never blocks on sync
//! internals.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

/// Snapshot of the sync engine's externally visible state
#[derive(Debug, Clone, PartialEq)]
pub struct SyncStatus {
    /// Current connectivity
    pub is_online: bool,
    /// Queued, not-yet-confirmed mutations
    pub pending_count: u64,
    /// Whether a replay or refresh pass is in flight
    pub syncing: bool,
    /// Completion time of the last successful sync or refresh
    pub last_sync: Option<DateTime<Utc>>,
    /// Last sync error; cleared by the user via [`StatusHandle::clear_error`]
    pub error: Option<String>,
}

impl SyncStatus {
    fn initial(is_online: bool) -> Self {
        Self {
            is_online,
            pending_count: 0,
            syncing: false,
            last_sync: None,
            error: None,
        }
    }
}

/// Cloneable handle onto the status cell.
///
/// Transient sync errors only ever appear here as the `error` string; they
/// never block operations against the local cache.
#[derive(Debug, Clone)]
pub struct StatusHandle {
    tx: Arc<watch::Sender<SyncStatus>>,
}

impl StatusHandle {
    pub(crate) fn new(is_online: bool) -> Self {
        let (tx, _rx) = watch::channel(SyncStatus::initial(is_online));
        Self { tx: Arc::new(tx) }
    }

    /// Current snapshot
    pub fn current(&self) -> SyncStatus {
        self.tx.borrow().clone()
    }

    /// Subscribe to status changes
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.tx.subscribe()
    }

    /// Clear the error string
    pub fn clear_error(&self) {
        self.tx.send_modify(|status| status.error = None);
    }

    pub(crate) fn set_online(&self, online: bool) {
        self.tx.send_modify(|status| {
            status.is_online = online;
            status.error = None;
        });
    }

    pub(crate) fn set_pending_count(&self, count: u64) {
        self.tx.send_modify(|status| status.pending_count = count);
    }

    pub(crate) fn begin_sync(&self) {
        self.tx.send_modify(|status| {
            status.syncing = true;
            status.error = None;
        });
    }

    pub(crate) fn finish_sync(&self, pending_count: u64) {
        self.tx.send_modify(|status| {
            status.syncing = false;
            status.pending_count = pending_count;
            status.last_sync = Some(Utc::now());
        });
    }

    pub(crate) fn fail_sync(&self, error: String) {
        self.tx.send_modify(|status| {
            status.syncing = false;
            status.error = Some(error);
        });
    }
}
