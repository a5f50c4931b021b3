//! # Sync Manager
//!
//! Single authoritative gateway for all entity reads and writes. Decides
//! local-vs-remote routing, owns the pending-mutation queue, and runs the
//! replay protocol when connectivity returns.
//!
//! ## Routing
//!
//! Every write lands in the local cache first (optimistic write). When
//! online, the same operation is attempted against the remote exactly once;
//! success reconciles the local record with the server-assigned identity,
//! failure or offline appends a pending-sync entry. Reads prefer a remote
//! fetch with a cache refresh and fall back to the cache.
//!
//! ## Replay
//!
//! `sync_pending_data` processes the queue oldest first, strictly
//! sequentially, under a single-flight guard. A failing entry's retry
//! counter is bumped; at the configured ceiling the entry moves to the
//! dead-letter table and will never be retried.
//!
//! Remote failures during entity mutations are swallowed into the queue.
//! Only `manual_sync` and `refresh_from_server` are online-only and
//! propagate errors.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::connectivity::ConnectivityMonitor;
use crate::error::{Result, SyncError};
use crate::local_db::LocalDatabase;
use crate::model::{
    generate_local_id, now_rfc3339, today, Collection, CreatePayload, DeadLetter, DeletePayload,
    PendingSync, Rt, RtInput, RtPatch, SavingsKind, SavingsTransaction, SavingsTransactionInput,
    SyncAction, UpdatePayload, WasteTransaction, WasteTransactionInput, WasteType,
};
use crate::remote::RemoteStore;
use crate::status::StatusHandle;

/// Orchestrates reads and writes across the local cache and the remote data
/// service.
///
/// Explicitly constructed and passed by reference (or `Arc`) to whatever
/// owns the application lifecycle; there is no process-wide singleton.
pub struct SyncManager {
    pub(crate) db: LocalDatabase,
    pub(crate) remote: Arc<dyn RemoteStore>,
    connectivity: ConnectivityMonitor,
    status: StatusHandle,
    config: Config,
    /// Single-flight guard: two replay passes must never interleave
    replay_guard: Mutex<()>,
}

impl SyncManager {
    /// Create a manager over an opened cache and remote client.
    ///
    /// Loads the initial pending count into the status surface.
    pub async fn new(
        db: LocalDatabase,
        remote: Arc<dyn RemoteStore>,
        connectivity: ConnectivityMonitor,
        config: Config,
    ) -> Result<Self> {
        let status = StatusHandle::new(connectivity.is_online());
        let manager = Self {
            db,
            remote,
            connectivity,
            status,
            config,
            replay_guard: Mutex::new(()),
        };
        let pending = manager.db.pending_sync_count().await?;
        manager.status.set_pending_count(pending);
        Ok(manager)
    }

    /// Status surface consumed by UI layers
    pub fn status(&self) -> StatusHandle {
        self.status.clone()
    }

    /// Connectivity monitor driving the state machine
    pub fn connectivity(&self) -> ConnectivityMonitor {
        self.connectivity.clone()
    }

    /// Local cache store
    pub fn db(&self) -> &LocalDatabase {
        &self.db
    }

    fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    // --- Neighborhood units ---

    /// Create a neighborhood unit.
    ///
    /// The unit is written to the cache under a local identifier before any
    /// network traffic; at most one remote round-trip is attempted.
    pub async fn create_rt(&self, input: RtInput) -> Result<Rt> {
        let now = now_rfc3339();
        let local = Rt {
            id: generate_local_id(),
            nomor: input.nomor.clone(),
            ketua_rt: input.ketua_rt.clone(),
            jumlah_kk: input.jumlah_kk,
            alamat: input.alamat.clone(),
            kontak: input.kontak.clone(),
            saldo: 0.0,
            total_transaksi: 0,
            created_at: now.clone(),
            updated_at: now,
        };
        self.db.insert_rt_local(&local).await?;

        if self.is_online() {
            match self.remote.insert_rt(&input).await {
                Ok(server) => {
                    self.db.reconcile_rt_id(&local.id, &server).await?;
                    return Ok(server);
                }
                Err(err) => {
                    warn!(error = %err, "failed to push new unit, queueing");
                    self.enqueue_create(Collection::Rt, &input, &local.id).await?;
                }
            }
        } else {
            self.enqueue_create(Collection::Rt, &input, &local.id).await?;
        }

        Ok(local)
    }

    /// Patch a unit; the cache copy is updated immediately and marked
    /// unsynced until the remote confirms
    pub async fn update_rt(&self, id: &str, patch: RtPatch) -> Result<()> {
        let mut rt = self
            .db
            .get_rt(id)
            .await?
            .ok_or_else(|| SyncError::UnknownRt(id.to_string()))?;
        patch.apply(&mut rt);
        rt.updated_at = now_rfc3339();
        self.db.upsert_rt(&rt, false).await?;

        if self.is_online() {
            match self.remote.update_rt(id, &patch).await {
                Ok(()) => {
                    self.db.set_rt_synced(id, true).await?;
                }
                Err(err) => {
                    warn!(error = %err, "failed to push unit update, queueing");
                    self.enqueue_rt_update(id, &patch).await?;
                }
            }
        } else {
            self.enqueue_rt_update(id, &patch).await?;
        }

        Ok(())
    }

    /// Delete a unit.
    ///
    /// The cache row is removed eagerly either way; an offline delete is
    /// invisible locally before the server confirms it.
    pub async fn delete_rt(&self, id: &str) -> Result<()> {
        if self.is_online() {
            match self.remote.delete_rt(id).await {
                Ok(()) => {
                    self.db.delete_rt(id).await?;
                    return Ok(());
                }
                Err(err) => {
                    warn!(error = %err, "failed to delete unit remotely, queueing");
                }
            }
        }

        self.db.delete_rt(id).await?;
        let payload = serde_json::to_value(DeletePayload { id: id.to_string() })?;
        self.db
            .add_pending_sync(Collection::Rt, SyncAction::Delete, &payload)
            .await?;
        self.notify_pending_count().await?;
        Ok(())
    }

    /// All units: remote fetch with cache refresh when possible, cache
    /// otherwise. Fetched rows are upserted; stale cache rows are not
    /// pruned here (see `refresh_from_server`).
    pub async fn list_rt(&self) -> Result<Vec<Rt>> {
        if self.is_online() {
            match self.remote.list_rt().await {
                Ok(rows) => {
                    for row in &rows {
                        self.db.upsert_rt(row, true).await?;
                    }
                    return Ok(rows);
                }
                Err(err) => {
                    warn!(error = %err, "failed to fetch units, using cache");
                }
            }
        }
        Ok(self.db.list_rt().await?)
    }

    // --- Waste categories ---

    /// Active waste categories. The remote query filters server-side; the
    /// cache fallback re-applies the active predicate locally.
    pub async fn list_waste_types(&self) -> Result<Vec<WasteType>> {
        if self.is_online() {
            match self.remote.list_active_waste_types().await {
                Ok(rows) => {
                    for row in &rows {
                        self.db.upsert_waste_type(row, true).await?;
                    }
                    return Ok(rows);
                }
                Err(err) => {
                    warn!(error = %err, "failed to fetch waste categories, using cache");
                }
            }
        }
        Ok(self.db.list_active_waste_types().await?)
    }

    // --- Waste deposits ---

    /// Record a waste deposit against a unit.
    ///
    /// `total_value` is frozen from the price snapshot at creation. The
    /// owning unit's balance and deposit counter move in the same local
    /// step, exactly once; the balance reaches the remote as a separate
    /// unit update (queued when it cannot be confirmed).
    pub async fn create_waste_transaction(
        &self,
        input: WasteTransactionInput,
    ) -> Result<WasteTransaction> {
        let rt = self
            .db
            .get_rt(&input.rt_id)
            .await?
            .ok_or_else(|| SyncError::UnknownRt(input.rt_id.clone()))?;

        let total_value = input.weight * input.price_per_kg;
        let local = WasteTransaction {
            id: generate_local_id(),
            rt_id: input.rt_id.clone(),
            waste_type_id: input.waste_type_id.clone(),
            date: input.date.clone().unwrap_or_else(today),
            weight: input.weight,
            price_per_kg: input.price_per_kg,
            total_value,
            notes: input.notes.clone(),
            created_at: now_rfc3339(),
        };
        self.db.insert_waste_transaction_local(&local).await?;
        self.db
            .adjust_rt_balance(&input.rt_id, total_value, true)
            .await?;

        let balance_patch = RtPatch {
            saldo: Some(rt.saldo + total_value),
            total_transaksi: Some(rt.total_transaksi + 1),
            ..Default::default()
        };

        if self.is_online() {
            match self.remote.insert_waste_transaction(&input).await {
                Ok(server) => {
                    self.db
                        .reconcile_waste_transaction_id(&local.id, &server)
                        .await?;
                    self.push_rt_balance(&input.rt_id, &balance_patch).await?;
                    return Ok(server);
                }
                Err(err) => {
                    warn!(error = %err, "failed to push waste deposit, queueing");
                    self.enqueue_create(Collection::WasteTransactions, &input, &local.id)
                        .await?;
                    self.enqueue_rt_update(&input.rt_id, &balance_patch).await?;
                }
            }
        } else {
            self.enqueue_create(Collection::WasteTransactions, &input, &local.id)
                .await?;
            self.enqueue_rt_update(&input.rt_id, &balance_patch).await?;
        }

        Ok(local)
    }

    /// All waste deposits, newest first
    pub async fn list_waste_transactions(&self) -> Result<Vec<WasteTransaction>> {
        if self.is_online() {
            match self.remote.list_waste_transactions().await {
                Ok(rows) => {
                    for row in &rows {
                        self.db.upsert_waste_transaction(row, true).await?;
                    }
                    return Ok(rows);
                }
                Err(err) => {
                    warn!(error = %err, "failed to fetch waste deposits, using cache");
                }
            }
        }
        Ok(self.db.list_waste_transactions().await?)
    }

    // --- Savings ---

    /// Record a savings adjustment.
    ///
    /// A withdrawal exceeding the unit's current balance is rejected before
    /// any local or remote write. Savings adjustments move the balance but
    /// never the deposit counter.
    pub async fn create_savings_transaction(
        &self,
        input: SavingsTransactionInput,
    ) -> Result<SavingsTransaction> {
        let rt = self
            .db
            .get_rt(&input.rt_id)
            .await?
            .ok_or_else(|| SyncError::UnknownRt(input.rt_id.clone()))?;

        if input.kind == SavingsKind::Withdrawal && input.amount > rt.saldo {
            return Err(SyncError::InsufficientBalance {
                available: rt.saldo,
                requested: input.amount,
            });
        }

        let delta = match input.kind {
            SavingsKind::Deposit => input.amount,
            SavingsKind::Withdrawal => -input.amount,
        };
        let local = SavingsTransaction {
            id: generate_local_id(),
            rt_id: input.rt_id.clone(),
            kind: input.kind,
            amount: input.amount,
            description: input.description.clone(),
            date: input.date.clone().unwrap_or_else(today),
            created_at: now_rfc3339(),
        };
        self.db.insert_savings_transaction_local(&local).await?;
        self.db.adjust_rt_balance(&input.rt_id, delta, false).await?;

        let balance_patch = RtPatch {
            saldo: Some(rt.saldo + delta),
            ..Default::default()
        };

        if self.is_online() {
            match self.remote.insert_savings_transaction(&input).await {
                Ok(server) => {
                    self.db
                        .reconcile_savings_transaction_id(&local.id, &server)
                        .await?;
                    self.push_rt_balance(&input.rt_id, &balance_patch).await?;
                    return Ok(server);
                }
                Err(err) => {
                    warn!(error = %err, "failed to push savings adjustment, queueing");
                    self.enqueue_create(Collection::SavingsTransactions, &input, &local.id)
                        .await?;
                    self.enqueue_rt_update(&input.rt_id, &balance_patch).await?;
                }
            }
        } else {
            self.enqueue_create(Collection::SavingsTransactions, &input, &local.id)
                .await?;
            self.enqueue_rt_update(&input.rt_id, &balance_patch).await?;
        }

        Ok(local)
    }

    /// All savings adjustments, newest first
    pub async fn list_savings_transactions(&self) -> Result<Vec<SavingsTransaction>> {
        if self.is_online() {
            match self.remote.list_savings_transactions().await {
                Ok(rows) => {
                    for row in &rows {
                        self.db.upsert_savings_transaction(row, true).await?;
                    }
                    return Ok(rows);
                }
                Err(err) => {
                    warn!(error = %err, "failed to fetch savings adjustments, using cache");
                }
            }
        }
        Ok(self.db.list_savings_transactions().await?)
    }

    // --- Replay ---

    /// Replay the pending queue.
    ///
    /// No-op when offline or when a pass is already in flight. Entries are
    /// processed oldest first; a create's success rekeys the local record to
    /// the server identity. Failures bump the retry counter and, at the
    /// ceiling, move the entry to the dead-letter table.
    pub async fn sync_pending_data(&self) -> Result<()> {
        if !self.is_online() {
            return Ok(());
        }
        let Ok(_guard) = self.replay_guard.try_lock() else {
            return Ok(());
        };

        self.status.begin_sync();
        match self.run_replay_pass().await {
            Ok(()) => {
                let count = self.db.pending_sync_count().await?;
                self.status.finish_sync(count);
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "replay pass aborted");
                self.status.fail_sync(err.to_string());
                Err(err)
            }
        }
    }

    async fn run_replay_pass(&self) -> Result<()> {
        let entries = self.db.get_pending_sync().await?;
        info!(count = entries.len(), "replaying pending mutations");

        for entry in entries {
            match self.replay_entry(&entry).await {
                Ok(()) => {
                    self.db.remove_pending_sync(&entry.id).await?;
                    info!(
                        collection = entry.collection.table_name(),
                        action = entry.action.as_str(),
                        "replayed pending mutation"
                    );
                }
                Err(err @ (SyncError::Remote(_) | SyncError::Serialization(_))) => {
                    let retries = self.db.increment_retry_count(&entry.id).await?;
                    if retries >= self.config.max_retry_attempts {
                        warn!(
                            id = %entry.id,
                            collection = entry.collection.table_name(),
                            retries,
                            "retry budget exhausted, moving entry to dead letter"
                        );
                        self.db.move_to_dead_letter(&entry.id, &err.to_string()).await?;
                    } else {
                        warn!(
                            id = %entry.id,
                            retries,
                            error = %err,
                            "replay failed, keeping entry queued"
                        );
                    }
                }
                // local storage failure is fatal to the pass
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    async fn replay_entry(&self, entry: &PendingSync) -> Result<()> {
        match (entry.collection, entry.action) {
            (Collection::Rt, SyncAction::Create) => {
                let payload: CreatePayload<RtInput> =
                    serde_json::from_value(entry.payload.clone())?;
                let server = self.remote.insert_rt(&payload.input).await?;
                self.db.reconcile_rt_id(&payload.local_id, &server).await?;
            }
            (Collection::Rt, SyncAction::Update) => {
                let payload: UpdatePayload<RtPatch> =
                    serde_json::from_value(entry.payload.clone())?;
                self.remote.update_rt(&payload.id, &payload.patch).await?;
                self.db.set_rt_synced(&payload.id, true).await?;
            }
            (Collection::Rt, SyncAction::Delete) => {
                let payload: DeletePayload = serde_json::from_value(entry.payload.clone())?;
                self.remote.delete_rt(&payload.id).await?;
            }
            (Collection::WasteTransactions, SyncAction::Create) => {
                let payload: CreatePayload<WasteTransactionInput> =
                    serde_json::from_value(entry.payload.clone())?;
                let server = self.remote.insert_waste_transaction(&payload.input).await?;
                self.db
                    .reconcile_waste_transaction_id(&payload.local_id, &server)
                    .await?;
            }
            (Collection::SavingsTransactions, SyncAction::Create) => {
                let payload: CreatePayload<SavingsTransactionInput> =
                    serde_json::from_value(entry.payload.clone())?;
                let server = self
                    .remote
                    .insert_savings_transaction(&payload.input)
                    .await?;
                self.db
                    .reconcile_savings_transaction_id(&payload.local_id, &server)
                    .await?;
            }
            (collection, action) => {
                // nothing enqueues these today; drop instead of retrying forever
                warn!(
                    collection = collection.table_name(),
                    action = action.as_str(),
                    "no replay handler for entry, dropping"
                );
            }
        }
        Ok(())
    }

    /// User-triggered replay; online-only, fails fast when offline
    pub async fn manual_sync(&self) -> Result<()> {
        if !self.is_online() {
            let err = SyncError::Offline;
            self.status.fail_sync(err.to_string());
            return Err(err);
        }
        self.sync_pending_data().await
    }

    /// Force-refetch every collection, treating the response as
    /// authoritative: fetched rows are upserted and cache rows absent from
    /// the response are pruned. Online-only.
    pub async fn refresh_from_server(&self) -> Result<()> {
        if !self.is_online() {
            let err = SyncError::Offline;
            self.status.fail_sync(err.to_string());
            return Err(err);
        }

        self.status.begin_sync();
        match self.run_refresh().await {
            Ok(()) => {
                let count = self.db.pending_sync_count().await?;
                self.status.finish_sync(count);
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "refresh from server failed");
                self.status.fail_sync(err.to_string());
                Err(err)
            }
        }
    }

    async fn run_refresh(&self) -> Result<()> {
        let units = self.remote.list_rt().await?;
        for row in &units {
            self.db.upsert_rt(row, true).await?;
        }
        let keep: Vec<String> = units.iter().map(|r| r.id.clone()).collect();
        self.db.prune_rt_except(&keep).await?;

        let types = self.remote.list_waste_types().await?;
        for row in &types {
            self.db.upsert_waste_type(row, true).await?;
        }
        let keep: Vec<String> = types.iter().map(|r| r.id.clone()).collect();
        self.db.prune_waste_types_except(&keep).await?;

        let deposits = self.remote.list_waste_transactions().await?;
        for row in &deposits {
            self.db.upsert_waste_transaction(row, true).await?;
        }
        let keep: Vec<String> = deposits.iter().map(|r| r.id.clone()).collect();
        self.db.prune_waste_transactions_except(&keep).await?;

        let savings = self.remote.list_savings_transactions().await?;
        for row in &savings {
            self.db.upsert_savings_transaction(row, true).await?;
        }
        let keep: Vec<String> = savings.iter().map(|r| r.id.clone()).collect();
        self.db.prune_savings_transactions_except(&keep).await?;

        info!(
            units = units.len(),
            waste_types = types.len(),
            "cache refreshed from server"
        );
        Ok(())
    }

    /// Number of queued mutations
    pub async fn pending_sync_count(&self) -> Result<u64> {
        Ok(self.db.pending_sync_count().await?)
    }

    /// Entries discarded after retry exhaustion, for operator inspection
    pub async fn dead_letters(&self) -> Result<Vec<DeadLetter>> {
        Ok(self.db.get_dead_letters().await?)
    }

    // --- Connectivity state machine ---

    /// React to a connectivity transition; offline→online triggers a replay
    /// pass
    pub async fn handle_transition(&self, online: bool) {
        self.status.set_online(online);
        if online {
            info!("back online, starting sync");
            if let Err(err) = self.sync_pending_data().await {
                error!(error = %err, "sync after reconnect failed");
            }
        } else {
            info!("gone offline, switching to local mode");
        }
    }

    /// Drive the state machine from the connectivity change stream until the
    /// monitor is dropped
    pub async fn run_connectivity_loop(self: Arc<Self>) {
        let mut rx = self.connectivity.subscribe();
        loop {
            if rx.changed().await.is_err() {
                break;
            }
            let online = *rx.borrow_and_update();
            self.handle_transition(online).await;
        }
    }

    /// Spawn the connectivity loop as a background task
    pub fn spawn(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(manager.run_connectivity_loop())
    }

    // --- Queue helpers ---

    async fn enqueue_create<T: Serialize>(
        &self,
        collection: Collection,
        input: &T,
        local_id: &str,
    ) -> Result<()> {
        let mut payload = serde_json::to_value(input)?;
        payload["local_id"] = serde_json::Value::String(local_id.to_string());
        self.db
            .add_pending_sync(collection, SyncAction::Create, &payload)
            .await?;
        self.notify_pending_count().await
    }

    async fn enqueue_rt_update(&self, id: &str, patch: &RtPatch) -> Result<()> {
        let mut payload = serde_json::to_value(patch)?;
        payload["id"] = serde_json::Value::String(id.to_string());
        self.db
            .add_pending_sync(Collection::Rt, SyncAction::Update, &payload)
            .await?;
        self.notify_pending_count().await
    }

    /// Push the owning unit's balance to the remote; queue on failure
    async fn push_rt_balance(&self, rt_id: &str, patch: &RtPatch) -> Result<()> {
        match self.remote.update_rt(rt_id, patch).await {
            Ok(()) => {
                self.db.set_rt_synced(rt_id, true).await?;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, rt_id, "failed to push unit balance, queueing");
                self.enqueue_rt_update(rt_id, patch).await
            }
        }
    }

    async fn notify_pending_count(&self) -> Result<()> {
        let count = self.db.pending_sync_count().await?;
        self.status.set_pending_count(count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RemoteError, RemoteResult};
    use crate::model::WasteTypeInput;
    use async_trait::async_trait;

    /// Remote that refuses every call, as if the host were unreachable
    struct UnreachableRemote;

    fn down<T>() -> RemoteResult<T> {
        Err(RemoteError::Network("connection refused".to_string()))
    }

    #[async_trait]
    impl RemoteStore for UnreachableRemote {
        async fn insert_rt(&self, _input: &RtInput) -> RemoteResult<Rt> {
            down()
        }
        async fn update_rt(&self, _id: &str, _patch: &RtPatch) -> RemoteResult<()> {
            down()
        }
        async fn delete_rt(&self, _id: &str) -> RemoteResult<()> {
            down()
        }
        async fn list_rt(&self) -> RemoteResult<Vec<Rt>> {
            down()
        }
        async fn count_rt(&self) -> RemoteResult<i64> {
            down()
        }
        async fn insert_waste_type(&self, _input: &WasteTypeInput) -> RemoteResult<WasteType> {
            down()
        }
        async fn list_active_waste_types(&self) -> RemoteResult<Vec<WasteType>> {
            down()
        }
        async fn list_waste_types(&self) -> RemoteResult<Vec<WasteType>> {
            down()
        }
        async fn count_waste_types(&self) -> RemoteResult<i64> {
            down()
        }
        async fn insert_waste_transaction(
            &self,
            _input: &WasteTransactionInput,
        ) -> RemoteResult<WasteTransaction> {
            down()
        }
        async fn list_waste_transactions(&self) -> RemoteResult<Vec<WasteTransaction>> {
            down()
        }
        async fn insert_savings_transaction(
            &self,
            _input: &SavingsTransactionInput,
        ) -> RemoteResult<SavingsTransaction> {
            down()
        }
        async fn list_savings_transactions(&self) -> RemoteResult<Vec<SavingsTransaction>> {
            down()
        }
    }

    async fn offline_manager() -> SyncManager {
        let db = LocalDatabase::open_in_memory().await.unwrap();
        SyncManager::new(
            db,
            Arc::new(UnreachableRemote),
            ConnectivityMonitor::new(false),
            Config::new(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_offline_create_queues_without_error() {
        let manager = offline_manager().await;
        let rt = manager
            .create_rt(RtInput {
                nomor: "009".to_string(),
                ketua_rt: "Bapak Ahmad".to_string(),
                jumlah_kk: 12,
                alamat: None,
                kontak: None,
            })
            .await
            .unwrap();

        assert!(crate::model::is_local_id(&rt.id));
        assert_eq!(manager.pending_sync_count().await.unwrap(), 1);
        assert_eq!(manager.status().current().pending_count, 1);
    }

    #[tokio::test]
    async fn test_remote_failure_while_online_queues_without_error() {
        let db = LocalDatabase::open_in_memory().await.unwrap();
        let manager = SyncManager::new(
            db,
            Arc::new(UnreachableRemote),
            ConnectivityMonitor::new(true),
            Config::new(),
        )
        .await
        .unwrap();

        let rt = manager
            .create_rt(RtInput {
                nomor: "001".to_string(),
                ketua_rt: "Ibu Sari".to_string(),
                jumlah_kk: 20,
                alamat: None,
                kontak: None,
            })
            .await
            .unwrap();

        // the remote call failed but the caller still got the local record
        assert!(crate::model::is_local_id(&rt.id));
        assert_eq!(manager.pending_sync_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_manual_sync_offline_fails_fast() {
        let manager = offline_manager().await;
        let err = manager.manual_sync().await.unwrap_err();
        assert!(matches!(err, SyncError::Offline));
        assert_eq!(
            manager.status().current().error.as_deref(),
            Some("cannot sync while offline")
        );
    }

    #[tokio::test]
    async fn test_refresh_offline_fails_fast() {
        let manager = offline_manager().await;
        let err = manager.refresh_from_server().await.unwrap_err();
        assert!(matches!(err, SyncError::Offline));
    }

    #[tokio::test]
    async fn test_sync_pending_data_is_noop_offline() {
        let manager = offline_manager().await;
        manager
            .create_rt(RtInput {
                nomor: "002".to_string(),
                ketua_rt: "Bapak Yani".to_string(),
                jumlah_kk: 8,
                alamat: None,
                kontak: None,
            })
            .await
            .unwrap();

        manager.sync_pending_data().await.unwrap();
        assert_eq!(manager.pending_sync_count().await.unwrap(), 1);
    }
}
