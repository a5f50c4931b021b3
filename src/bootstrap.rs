//! # Bootstrap Seeding
//!
//! First-run seeding for empty deployments. Online, the remote collections
//! are the source of truth: units and waste categories are inserted there
//! only when their remote counts are zero, and the returned rows land in the
//! cache as synced. Offline (or when seeding the remote fails), a small demo
//! set of waste categories is written straight into the cache so the app is
//! usable before the first connection; demo rows carry local identifiers and
//! are never queued for replay.

use tracing::{info, warn};

use crate::error::Result;
use crate::manager::SyncManager;
use crate::model::{generate_local_id, now_rfc3339, RtInput, WasteType, WasteTypeInput};

/// Default neighborhood units for a fresh deployment
pub fn default_units() -> Vec<RtInput> {
    vec![
        RtInput {
            nomor: "001".to_string(),
            ketua_rt: "Bapak Sumarno".to_string(),
            jumlah_kk: 25,
            alamat: Some("Jl. Merdeka No. 1".to_string()),
            kontak: Some("081234567801".to_string()),
        },
        RtInput {
            nomor: "002".to_string(),
            ketua_rt: "Ibu Sari Wahyuni".to_string(),
            jumlah_kk: 30,
            alamat: Some("Jl. Merdeka No. 2".to_string()),
            kontak: Some("081234567802".to_string()),
        },
        RtInput {
            nomor: "003".to_string(),
            ketua_rt: "Bapak Ahmad Yani".to_string(),
            jumlah_kk: 28,
            alamat: Some("Jl. Merdeka No. 3".to_string()),
            kontak: Some("081234567803".to_string()),
        },
    ]
}

/// Default waste categories for a fresh deployment
pub fn default_waste_types() -> Vec<WasteTypeInput> {
    vec![
        WasteTypeInput {
            name: "Plastik".to_string(),
            price_per_kg: 2000.0,
            unit: "kg".to_string(),
            description: Some("Botol plastik, kantong plastik, kemasan plastik".to_string()),
            is_active: true,
        },
        WasteTypeInput {
            name: "Kertas".to_string(),
            price_per_kg: 1500.0,
            unit: "kg".to_string(),
            description: Some("Koran bekas, kardus, kertas HVS".to_string()),
            is_active: true,
        },
        WasteTypeInput {
            name: "Kaleng".to_string(),
            price_per_kg: 3000.0,
            unit: "kg".to_string(),
            description: Some("Kaleng minuman, kaleng makanan".to_string()),
            is_active: true,
        },
        WasteTypeInput {
            name: "Botol Kaca".to_string(),
            price_per_kg: 500.0,
            unit: "kg".to_string(),
            description: Some("Botol kaca bekas minuman dan kecap".to_string()),
            is_active: true,
        },
    ]
}

/// Demo waste categories seeded into the cache when the remote is not
/// reachable on first run
fn demo_waste_types() -> Vec<WasteTypeInput> {
    default_waste_types().into_iter().take(3).collect()
}

impl SyncManager {
    /// Seed default data into an empty deployment; idempotent.
    ///
    /// Attempts remote seeding when online and falls back to a local demo
    /// seed when offline or when the remote refuses.
    pub async fn ensure_seed_data(&self) -> Result<()> {
        if self.connectivity().is_online() {
            match self.seed_remote().await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    warn!(error = %err, "remote seeding failed, falling back to local demo seed");
                }
            }
        }
        self.seed_local().await
    }

    async fn seed_remote(&self) -> Result<()> {
        if self.remote.count_rt().await? == 0 {
            info!("seeding default neighborhood units");
            for input in default_units() {
                let row = self.remote.insert_rt(&input).await?;
                self.db.upsert_rt(&row, true).await?;
            }
        }

        if self.remote.count_waste_types().await? == 0 {
            info!("seeding default waste categories");
            for input in default_waste_types() {
                let row = self.remote.insert_waste_type(&input).await?;
                self.db.upsert_waste_type(&row, true).await?;
            }
        }

        Ok(())
    }

    async fn seed_local(&self) -> Result<()> {
        if self.db.count_waste_types().await? > 0 {
            return Ok(());
        }

        info!("seeding demo waste categories into the local cache");
        for input in demo_waste_types() {
            let row = WasteType {
                id: generate_local_id(),
                name: input.name,
                price_per_kg: input.price_per_kg,
                unit: input.unit,
                description: input.description,
                is_active: input.is_active,
                created_at: now_rfc3339(),
            };
            self.db.upsert_waste_type(&row, false).await?;
        }
        Ok(())
    }
}
