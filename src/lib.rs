//! # Bank Sampah Sync
//!
//! Offline-first data layer for a neighborhood recycling-bank application.
//!
//! Mirrors four remote collections (neighborhood units, waste categories,
//! waste deposits, savings adjustments) into a local SQLite cache and keeps
//! the two sides convergent across connectivity loss. Writes apply locally
//! first; unconfirmed mutations queue for sequential replay when
//! connectivity returns, with a bounded retry budget per entry.
//!
//! ## Features
//!
//! - **Local cache** - SQLite mirror of every collection, readable offline
//! - **Pending queue** - durable oldest-first mutation log with retry
//!   counting and a dead-letter table
//! - **Identity reconciliation** - offline creates get `local_`-prefixed
//!   identifiers, rekeyed to server identities on first successful sync
//! - **Status surface** - observable connectivity, pending count, sync
//!   progress, last-sync time, and clearable error
//! - **Bootstrap seeding** - idempotent default data for empty deployments
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use bank_sampah_sync::{
//!     Config, ConnectivityMonitor, HttpRemote, LocalDatabase, SyncManager,
//! };
//!
//! # async fn run() -> bank_sampah_sync::Result<()> {
//! let config = Config::new().with_api_key("anon-key");
//! let db = LocalDatabase::open_in_memory().await?;
//! let remote = Arc::new(HttpRemote::new(config.clone())?);
//! let connectivity = ConnectivityMonitor::default();
//!
//! let manager = Arc::new(SyncManager::new(db, remote, connectivity.clone(), config).await?);
//! manager.spawn();
//! manager.ensure_seed_data().await?;
//!
//! // the embedder pushes connectivity transitions
//! connectivity.set_online(false);
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod local_db;
pub mod manager;
pub mod model;
pub mod remote;
pub mod status;

pub use bootstrap::{default_units, default_waste_types};
pub use config::Config;
pub use connectivity::ConnectivityMonitor;
pub use error::{RemoteError, RemoteResult, Result, SyncError};
pub use local_db::{CacheStats, LocalDatabase};
pub use manager::SyncManager;
pub use model::{
    Collection, DeadLetter, PendingSync, Rt, RtInput, RtPatch, SavingsKind, SavingsTransaction,
    SavingsTransactionInput, SyncAction, WasteTransaction, WasteTransactionInput, WasteType,
    WasteTypeInput,
};
pub use remote::{HttpRemote, RemoteStore};
pub use status::{StatusHandle, SyncStatus};
