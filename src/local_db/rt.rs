//! Neighborhood-unit cache operations.
//!
//! Rows carry a `synced` flag and, for units created offline, the original
//! local identifier in `local_id`. Rekeying a row from its local identifier
//! to the server-assigned one happens only through [`LocalDatabase::reconcile_rt_id`].

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{LocalDatabase, Result};
use crate::model::Rt;

fn row_to_rt(row: &SqliteRow) -> Result<Rt> {
    Ok(Rt {
        id: row.try_get("id")?,
        nomor: row.try_get("nomor")?,
        ketua_rt: row.try_get("ketua_rt")?,
        jumlah_kk: row.try_get("jumlah_kk")?,
        alamat: row.try_get("alamat")?,
        kontak: row.try_get("kontak")?,
        saldo: row.try_get("saldo")?,
        total_transaksi: row.try_get("total_transaksi")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl LocalDatabase {
    /// Insert a unit created on-device, unsynced, keyed by its local id
    pub async fn insert_rt_local(&self, rt: &Rt) -> Result<()> {
        sqlx::query(
            "INSERT INTO rt (
                id, nomor, ketua_rt, jumlah_kk, alamat, kontak,
                saldo, total_transaksi, created_at, updated_at, synced, local_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(&rt.id)
        .bind(&rt.nomor)
        .bind(&rt.ketua_rt)
        .bind(rt.jumlah_kk)
        .bind(&rt.alamat)
        .bind(&rt.kontak)
        .bind(rt.saldo)
        .bind(rt.total_transaksi)
        .bind(&rt.created_at)
        .bind(&rt.updated_at)
        .bind(&rt.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replace-or-insert a unit by primary key.
    ///
    /// An existing row's `local_id` is preserved so the local origin of an
    /// offline-created unit stays inspectable after reconciliation.
    pub async fn upsert_rt(&self, rt: &Rt, synced: bool) -> Result<()> {
        sqlx::query(
            "INSERT INTO rt (
                id, nomor, ketua_rt, jumlah_kk, alamat, kontak,
                saldo, total_transaksi, created_at, updated_at, synced
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                nomor = excluded.nomor,
                ketua_rt = excluded.ketua_rt,
                jumlah_kk = excluded.jumlah_kk,
                alamat = excluded.alamat,
                kontak = excluded.kontak,
                saldo = excluded.saldo,
                total_transaksi = excluded.total_transaksi,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                synced = excluded.synced",
        )
        .bind(&rt.id)
        .bind(&rt.nomor)
        .bind(&rt.ketua_rt)
        .bind(rt.jumlah_kk)
        .bind(&rt.alamat)
        .bind(&rt.kontak)
        .bind(rt.saldo)
        .bind(rt.total_transaksi)
        .bind(&rt.created_at)
        .bind(&rt.updated_at)
        .bind(synced)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch a unit by primary key
    pub async fn get_rt(&self, id: &str) -> Result<Option<Rt>> {
        let row = sqlx::query("SELECT * FROM rt WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row_to_rt(&row)?)),
            None => Ok(None),
        }
    }

    /// All units ordered by display number
    pub async fn list_rt(&self) -> Result<Vec<Rt>> {
        let rows = sqlx::query("SELECT * FROM rt ORDER BY nomor ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_rt).collect()
    }

    /// Set the synced flag of a unit
    pub async fn set_rt_synced(&self, id: &str, synced: bool) -> Result<()> {
        sqlx::query("UPDATE rt SET synced = ? WHERE id = ?")
            .bind(synced)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete a unit by primary key
    pub async fn delete_rt(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM rt WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Apply a balance adjustment in a single local write.
    ///
    /// `saldo` moves by `delta`; `total_transaksi` increments only for
    /// waste-deposit events. The row is marked unsynced until the remote
    /// confirms the propagated balance.
    pub async fn adjust_rt_balance(
        &self,
        id: &str,
        delta: f64,
        count_transaction: bool,
    ) -> Result<()> {
        let tx_increment: i64 = if count_transaction { 1 } else { 0 };
        sqlx::query(
            "UPDATE rt SET
                saldo = saldo + ?,
                total_transaksi = total_transaksi + ?,
                updated_at = ?,
                synced = 0
             WHERE id = ?",
        )
        .bind(delta)
        .bind(tx_increment)
        .bind(crate::model::now_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Rekey a unit created offline to its server-assigned identity.
    ///
    /// The row stored under `local_id` is replaced by the server record,
    /// marked synced, with `local_id` retained. After this the unit is no
    /// longer retrievable under its local identifier.
    pub async fn reconcile_rt_id(&self, local_id: &str, server: &Rt) -> Result<()> {
        sqlx::query(
            "UPDATE rt SET
                id = ?, nomor = ?, ketua_rt = ?, jumlah_kk = ?, alamat = ?,
                kontak = ?, saldo = ?, total_transaksi = ?, created_at = ?,
                updated_at = ?, synced = 1, local_id = ?
             WHERE id = ?",
        )
        .bind(&server.id)
        .bind(&server.nomor)
        .bind(&server.ketua_rt)
        .bind(server.jumlah_kk)
        .bind(&server.alamat)
        .bind(&server.kontak)
        .bind(server.saldo)
        .bind(server.total_transaksi)
        .bind(&server.created_at)
        .bind(&server.updated_at)
        .bind(local_id)
        .bind(local_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete units absent from an authoritative full fetch
    pub async fn prune_rt_except(&self, keep: &[String]) -> Result<u64> {
        self.prune_table_except("rt", keep).await
    }

    /// Shared prune helper: delete all rows of `table` whose id is not in
    /// `keep`
    pub(crate) async fn prune_table_except(&self, table: &str, keep: &[String]) -> Result<u64> {
        if keep.is_empty() {
            let result = sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&self.pool)
                .await?;
            return Ok(result.rows_affected());
        }

        let placeholders = vec!["?"; keep.len()].join(", ");
        let sql = format!("DELETE FROM {} WHERE id NOT IN ({})", table, placeholders);
        let mut query = sqlx::query(&sql);
        for id in keep {
            query = query.bind(id);
        }
        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
