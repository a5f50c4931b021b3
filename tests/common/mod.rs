//! Shared test fixtures: an in-memory remote store with failure injection
//! and a manager constructor over it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bank_sampah_sync::{
    Config, ConnectivityMonitor, LocalDatabase, RemoteError, RemoteResult, RemoteStore, Rt,
    RtInput, RtPatch, SavingsTransaction, SavingsTransactionInput, SyncManager, WasteTransaction,
    WasteTransactionInput, WasteType, WasteTypeInput,
};
use chrono::Utc;

#[derive(Default)]
struct MockState {
    rts: HashMap<String, Rt>,
    waste_types: HashMap<String, WasteType>,
    waste_transactions: HashMap<String, WasteTransaction>,
    savings_transactions: HashMap<String, SavingsTransaction>,
    next_id: u64,
    /// Number of upcoming calls to fail with a 503
    fail_next: u32,
    /// When set, every call fails with a network error
    unreachable: bool,
    /// Successful mutations in arrival order, as `table:detail` strings
    mutation_log: Vec<String>,
}

impl MockState {
    fn gate(&mut self) -> RemoteResult<()> {
        if self.unreachable {
            return Err(RemoteError::Network("host unreachable".to_string()));
        }
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(RemoteError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("srv-{}", self.next_id)
    }
}

/// In-memory stand-in for the hosted data service
#[derive(Default)]
pub struct MockRemote {
    state: Mutex<MockState>,
}

impl MockRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail the next `n` calls with a 503
    pub fn fail_next(&self, n: u32) {
        self.state.lock().unwrap().fail_next = n;
    }

    /// Toggle total unreachability
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unwrap().unreachable = unreachable;
    }

    /// Successful mutations in arrival order
    pub fn mutation_log(&self) -> Vec<String> {
        self.state.lock().unwrap().mutation_log.clone()
    }

    pub fn rt(&self, id: &str) -> Option<Rt> {
        self.state.lock().unwrap().rts.get(id).cloned()
    }

    pub fn rt_count(&self) -> usize {
        self.state.lock().unwrap().rts.len()
    }

    pub fn waste_type_count(&self) -> usize {
        self.state.lock().unwrap().waste_types.len()
    }

    pub fn waste_transaction_count(&self) -> usize {
        self.state.lock().unwrap().waste_transactions.len()
    }

    pub fn savings_transaction_count(&self) -> usize {
        self.state.lock().unwrap().savings_transactions.len()
    }

    /// Seed a unit directly, bypassing the gate
    pub fn put_rt(&self, rt: Rt) {
        self.state.lock().unwrap().rts.insert(rt.id.clone(), rt);
    }
}

#[async_trait]
impl RemoteStore for MockRemote {
    async fn insert_rt(&self, input: &RtInput) -> RemoteResult<Rt> {
        let mut state = self.state.lock().unwrap();
        state.gate()?;
        let now = Utc::now().to_rfc3339();
        let rt = Rt {
            id: state.next_id(),
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
        state.rts.insert(rt.id.clone(), rt.clone());
        state.mutation_log.push(format!("rt:create:{}", rt.nomor));
        Ok(rt)
    }

    async fn update_rt(&self, id: &str, patch: &RtPatch) -> RemoteResult<()> {
        let mut state = self.state.lock().unwrap();
        state.gate()?;
        if let Some(rt) = state.rts.get_mut(id) {
            patch.apply(rt);
            rt.updated_at = Utc::now().to_rfc3339();
        }
        state.mutation_log.push(format!("rt:update:{}", id));
        Ok(())
    }

    async fn delete_rt(&self, id: &str) -> RemoteResult<()> {
        let mut state = self.state.lock().unwrap();
        state.gate()?;
        state.rts.remove(id);
        state.mutation_log.push(format!("rt:delete:{}", id));
        Ok(())
    }

    async fn list_rt(&self) -> RemoteResult<Vec<Rt>> {
        let mut state = self.state.lock().unwrap();
        state.gate()?;
        let mut rows: Vec<Rt> = state.rts.values().cloned().collect();
        rows.sort_by(|a, b| a.nomor.cmp(&b.nomor));
        Ok(rows)
    }

    async fn count_rt(&self) -> RemoteResult<i64> {
        let mut state = self.state.lock().unwrap();
        state.gate()?;
        Ok(state.rts.len() as i64)
    }

    async fn insert_waste_type(&self, input: &WasteTypeInput) -> RemoteResult<WasteType> {
        let mut state = self.state.lock().unwrap();
        state.gate()?;
        let row = WasteType {
            id: state.next_id(),
            name: input.name.clone(),
            price_per_kg: input.price_per_kg,
            unit: input.unit.clone(),
            description: input.description.clone(),
            is_active: input.is_active,
            created_at: Utc::now().to_rfc3339(),
        };
        state.waste_types.insert(row.id.clone(), row.clone());
        state
            .mutation_log
            .push(format!("waste_types:create:{}", row.name));
        Ok(row)
    }

    async fn list_active_waste_types(&self) -> RemoteResult<Vec<WasteType>> {
        let mut state = self.state.lock().unwrap();
        state.gate()?;
        let mut rows: Vec<WasteType> = state
            .waste_types
            .values()
            .filter(|t| t.is_active)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn list_waste_types(&self) -> RemoteResult<Vec<WasteType>> {
        let mut state = self.state.lock().unwrap();
        state.gate()?;
        let mut rows: Vec<WasteType> = state.waste_types.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn count_waste_types(&self) -> RemoteResult<i64> {
        let mut state = self.state.lock().unwrap();
        state.gate()?;
        Ok(state.waste_types.len() as i64)
    }

    async fn insert_waste_transaction(
        &self,
        input: &WasteTransactionInput,
    ) -> RemoteResult<WasteTransaction> {
        let mut state = self.state.lock().unwrap();
        state.gate()?;
        let now = Utc::now();
        let row = WasteTransaction {
            id: state.next_id(),
            rt_id: input.rt_id.clone(),
            waste_type_id: input.waste_type_id.clone(),
            date: input
                .date
                .clone()
                .unwrap_or_else(|| now.format("%Y-%m-%d").to_string()),
            weight: input.weight,
            price_per_kg: input.price_per_kg,
            total_value: input.weight * input.price_per_kg,
            notes: input.notes.clone(),
            created_at: now.to_rfc3339(),
        };
        state.waste_transactions.insert(row.id.clone(), row.clone());
        state
            .mutation_log
            .push(format!("waste_transactions:create:{}", row.id));
        Ok(row)
    }

    async fn list_waste_transactions(&self) -> RemoteResult<Vec<WasteTransaction>> {
        let mut state = self.state.lock().unwrap();
        state.gate()?;
        let mut rows: Vec<WasteTransaction> = state.waste_transactions.values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn insert_savings_transaction(
        &self,
        input: &SavingsTransactionInput,
    ) -> RemoteResult<SavingsTransaction> {
        let mut state = self.state.lock().unwrap();
        state.gate()?;
        let now = Utc::now();
        let row = SavingsTransaction {
            id: state.next_id(),
            rt_id: input.rt_id.clone(),
            kind: input.kind,
            amount: input.amount,
            description: input.description.clone(),
            date: input
                .date
                .clone()
                .unwrap_or_else(|| now.format("%Y-%m-%d").to_string()),
            created_at: now.to_rfc3339(),
        };
        state
            .savings_transactions
            .insert(row.id.clone(), row.clone());
        state
            .mutation_log
            .push(format!("savings_transactions:create:{}", row.id));
        Ok(row)
    }

    async fn list_savings_transactions(&self) -> RemoteResult<Vec<SavingsTransaction>> {
        let mut state = self.state.lock().unwrap();
        state.gate()?;
        let mut rows: Vec<SavingsTransaction> =
            state.savings_transactions.values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

/// Install a test subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Manager over a fresh in-memory cache and the given mock remote
pub async fn test_manager(remote: Arc<MockRemote>, online: bool) -> SyncManager {
    init_tracing();
    let db = LocalDatabase::open_in_memory().await.unwrap();
    SyncManager::new(
        db,
        remote,
        ConnectivityMonitor::new(online),
        Config::new(),
    )
    .await
    .unwrap()
}

/// Input for a unit with the given display number
pub fn rt_input(nomor: &str) -> RtInput {
    RtInput {
        nomor: nomor.to_string(),
        ketua_rt: format!("Ketua RT {}", nomor),
        jumlah_kk: 20,
        alamat: None,
        kontak: None,
    }
}

/// Input for a 10 kg plastic deposit at Rp 2.000/kg against the given unit
pub fn deposit_input(rt_id: &str) -> WasteTransactionInput {
    WasteTransactionInput {
        rt_id: rt_id.to_string(),
        waste_type_id: "wt-plastik".to_string(),
        date: None,
        weight: 10.0,
        price_per_kg: 2000.0,
        notes: None,
    }
}
