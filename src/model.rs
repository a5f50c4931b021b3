//! # Domain Model
//!
//! Row types for the four mirrored collections, their insert/patch inputs,
//! and the pending-sync queue types.
//!
//! Records created while offline are keyed by a *local* identifier until the
//! first successful sync assigns a server identifier. The two identifier
//! spaces are kept syntactically distinct: local identifiers always carry the
//! `local_` prefix and never collide with server-assigned UUIDs. Rekeying a
//! row from its local identifier to the server identifier is an explicit
//! transition (`LocalDatabase::reconcile_*_id`).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix marking identifiers generated on-device before a server round-trip
pub const LOCAL_ID_PREFIX: &str = "local_";

/// Generate a fresh local identifier
pub fn generate_local_id() -> String {
    format!("{}{}", LOCAL_ID_PREFIX, Uuid::new_v4())
}

/// Whether an identifier belongs to the local (not yet synced) namespace
pub fn is_local_id(id: &str) -> bool {
    id.starts_with(LOCAL_ID_PREFIX)
}

/// Current timestamp in the RFC 3339 format stored in every timestamp column
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Current date as `YYYY-MM-DD`, the format of transaction `date` columns
pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

/// The mirrored remote collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Rt,
    WasteTypes,
    WasteTransactions,
    SavingsTransactions,
}

impl Collection {
    /// Table name as used by both stores and the pending queue
    pub fn table_name(&self) -> &'static str {
        match self {
            Collection::Rt => "rt",
            Collection::WasteTypes => "waste_types",
            Collection::WasteTransactions => "waste_transactions",
            Collection::SavingsTransactions => "savings_transactions",
        }
    }

    /// Parse a stored table name; `None` for unknown tables
    pub fn from_table_name(name: &str) -> Option<Self> {
        match name {
            "rt" => Some(Collection::Rt),
            "waste_types" => Some(Collection::WasteTypes),
            "waste_transactions" => Some(Collection::WasteTransactions),
            "savings_transactions" => Some(Collection::SavingsTransactions),
            _ => None,
        }
    }
}

/// Mutation kind recorded in a pending-sync entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Create,
    Update,
    Delete,
}

impl SyncAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncAction::Create => "create",
            SyncAction::Update => "update",
            SyncAction::Delete => "delete",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "create" => Some(SyncAction::Create),
            "update" => Some(SyncAction::Update),
            "delete" => Some(SyncAction::Delete),
            _ => None,
        }
    }
}

/// Neighborhood unit (RT), the principal account-bearing entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rt {
    pub id: String,
    /// Display number ("001", "002", ...)
    pub nomor: String,
    /// Leader name
    pub ketua_rt: String,
    /// Household count
    pub jumlah_kk: i64,
    pub alamat: Option<String>,
    pub kontak: Option<String>,
    /// Running balance; sum of all net-effect amounts applied to this unit
    pub saldo: f64,
    /// Running count of waste-deposit events (savings adjustments excluded)
    pub total_transaksi: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Insert input for a neighborhood unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtInput {
    pub nomor: String,
    pub ketua_rt: String,
    #[serde(default)]
    pub jumlah_kk: i64,
    #[serde(default)]
    pub alamat: Option<String>,
    #[serde(default)]
    pub kontak: Option<String>,
}

/// Partial update for a neighborhood unit; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RtPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nomor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ketua_rt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jumlah_kk: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alamat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kontak: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saldo: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_transaksi: Option<i64>,
}

impl RtPatch {
    /// Apply the patch to a cached row
    pub fn apply(&self, rt: &mut Rt) {
        if let Some(v) = &self.nomor {
            rt.nomor = v.clone();
        }
        if let Some(v) = &self.ketua_rt {
            rt.ketua_rt = v.clone();
        }
        if let Some(v) = self.jumlah_kk {
            rt.jumlah_kk = v;
        }
        if let Some(v) = &self.alamat {
            rt.alamat = Some(v.clone());
        }
        if let Some(v) = &self.kontak {
            rt.kontak = Some(v.clone());
        }
        if let Some(v) = self.saldo {
            rt.saldo = v;
        }
        if let Some(v) = self.total_transaksi {
            rt.total_transaksi = v;
        }
    }

    /// Whether the patch carries no fields at all
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Waste category with its price snapshot source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteType {
    pub id: String,
    pub name: String,
    pub price_per_kg: f64,
    pub unit: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

/// Insert input for a waste category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteTypeInput {
    pub name: String,
    pub price_per_kg: f64,
    pub unit: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Waste-deposit event against a unit. `total_value` is frozen at creation
/// from the price snapshot and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteTransaction {
    pub id: String,
    pub rt_id: String,
    pub waste_type_id: String,
    pub date: String,
    pub weight: f64,
    pub price_per_kg: f64,
    pub total_value: f64,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Insert input for a waste-deposit event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteTransactionInput {
    pub rt_id: String,
    pub waste_type_id: String,
    #[serde(default)]
    pub date: Option<String>,
    pub weight: f64,
    pub price_per_kg: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Direction of a savings adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavingsKind {
    Deposit,
    Withdrawal,
}

impl SavingsKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SavingsKind::Deposit => "deposit",
            SavingsKind::Withdrawal => "withdrawal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "deposit" => Some(SavingsKind::Deposit),
            "withdrawal" => Some(SavingsKind::Withdrawal),
            _ => None,
        }
    }
}

/// Signed savings adjustment against a unit's balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsTransaction {
    pub id: String,
    pub rt_id: String,
    #[serde(rename = "type")]
    pub kind: SavingsKind,
    pub amount: f64,
    pub description: Option<String>,
    pub date: String,
    pub created_at: String,
}

/// Insert input for a savings adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsTransactionInput {
    pub rt_id: String,
    #[serde(rename = "type")]
    pub kind: SavingsKind,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// A queued, not-yet-confirmed mutation awaiting remote replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSync {
    pub id: String,
    pub collection: Collection,
    pub action: SyncAction,
    /// The original operation's input, plus `local_id` for creates
    pub payload: serde_json::Value,
    /// Enqueue time, unix milliseconds
    pub timestamp: i64,
    pub retry_count: i64,
}

/// A pending entry whose retry budget was exhausted; retained for inspection
/// instead of being deleted outright
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadLetter {
    pub id: String,
    pub collection: Collection,
    pub action: SyncAction,
    pub payload: serde_json::Value,
    pub timestamp: i64,
    pub retry_count: i64,
    pub discarded_at: String,
    pub last_error: Option<String>,
}

/// Pending payload for a create: the insert input plus the local identifier
/// to reconcile on first successful replay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePayload<T> {
    #[serde(flatten)]
    pub input: T,
    pub local_id: String,
}

/// Pending payload for an update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePayload<T> {
    pub id: String,
    #[serde(flatten)]
    pub patch: T,
}

/// Pending payload for a delete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletePayload {
    pub id: String,
}
