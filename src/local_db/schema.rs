//! Local cache schema definitions.
//!
//! The table set mirrors the remote collections plus the pending-sync queue
//! and the dead-letter table. Schema bumps are additive only; a version bump
//! must preserve all existing rows.

/// Current local schema version
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Applied migration versions, oldest first
pub const MIGRATION_VERSIONS: &[i32] = &[1];

/// Statements creating the full table set. Executed one by one on open; all
/// statements are idempotent.
pub(crate) const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS rt (
        id TEXT PRIMARY KEY,
        nomor TEXT NOT NULL,
        ketua_rt TEXT NOT NULL,
        jumlah_kk INTEGER NOT NULL DEFAULT 0,
        alamat TEXT,
        kontak TEXT,
        saldo REAL NOT NULL DEFAULT 0,
        total_transaksi INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        synced INTEGER NOT NULL DEFAULT 0,
        local_id TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_rt_nomor ON rt(nomor)",
    "CREATE INDEX IF NOT EXISTS idx_rt_synced ON rt(synced)",
    "CREATE TABLE IF NOT EXISTS waste_types (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        price_per_kg REAL NOT NULL,
        unit TEXT NOT NULL,
        description TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        synced INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS idx_waste_types_name ON waste_types(name)",
    "CREATE INDEX IF NOT EXISTS idx_waste_types_active ON waste_types(is_active)",
    "CREATE TABLE IF NOT EXISTS waste_transactions (
        id TEXT PRIMARY KEY,
        rt_id TEXT NOT NULL,
        waste_type_id TEXT NOT NULL,
        date TEXT NOT NULL,
        weight REAL NOT NULL,
        price_per_kg REAL NOT NULL,
        total_value REAL NOT NULL,
        notes TEXT,
        created_at TEXT NOT NULL,
        synced INTEGER NOT NULL DEFAULT 0,
        local_id TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_waste_tx_rt ON waste_transactions(rt_id)",
    "CREATE INDEX IF NOT EXISTS idx_waste_tx_date ON waste_transactions(date)",
    "CREATE INDEX IF NOT EXISTS idx_waste_tx_synced ON waste_transactions(synced)",
    "CREATE TABLE IF NOT EXISTS savings_transactions (
        id TEXT PRIMARY KEY,
        rt_id TEXT NOT NULL,
        type TEXT NOT NULL,
        amount REAL NOT NULL,
        description TEXT,
        date TEXT NOT NULL,
        created_at TEXT NOT NULL,
        synced INTEGER NOT NULL DEFAULT 0,
        local_id TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_savings_tx_rt ON savings_transactions(rt_id)",
    "CREATE INDEX IF NOT EXISTS idx_savings_tx_date ON savings_transactions(date)",
    "CREATE INDEX IF NOT EXISTS idx_savings_tx_synced ON savings_transactions(synced)",
    "CREATE TABLE IF NOT EXISTS pending_sync (
        id TEXT PRIMARY KEY,
        collection TEXT NOT NULL,
        action TEXT NOT NULL,
        payload TEXT NOT NULL,
        timestamp INTEGER NOT NULL,
        retry_count INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS idx_pending_timestamp ON pending_sync(timestamp)",
    "CREATE TABLE IF NOT EXISTS dead_letter (
        id TEXT PRIMARY KEY,
        collection TEXT NOT NULL,
        action TEXT NOT NULL,
        payload TEXT NOT NULL,
        timestamp INTEGER NOT NULL,
        retry_count INTEGER NOT NULL,
        discarded_at TEXT NOT NULL,
        last_error TEXT
    )",
    "CREATE TABLE IF NOT EXISTS schema_migrations (
        version INTEGER PRIMARY KEY,
        applied_at TEXT NOT NULL
    )",
];

/// Check if the cache needs migration
pub fn needs_migration(current_version: i32) -> bool {
    current_version < CURRENT_SCHEMA_VERSION
}

/// Migrations newer than the given version, oldest first
pub fn pending_migrations(current_version: i32) -> Vec<i32> {
    MIGRATION_VERSIONS
        .iter()
        .filter(|&&v| v > current_version)
        .cloned()
        .collect()
}
