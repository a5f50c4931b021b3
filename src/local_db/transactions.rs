//! Waste-deposit and savings transaction cache operations.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{LocalDatabase, Result};
use crate::model::{SavingsKind, SavingsTransaction, WasteTransaction};

fn row_to_waste_transaction(row: &SqliteRow) -> Result<WasteTransaction> {
    Ok(WasteTransaction {
        id: row.try_get("id")?,
        rt_id: row.try_get("rt_id")?,
        waste_type_id: row.try_get("waste_type_id")?,
        date: row.try_get("date")?,
        weight: row.try_get("weight")?,
        price_per_kg: row.try_get("price_per_kg")?,
        total_value: row.try_get("total_value")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_savings_transaction(row: &SqliteRow) -> Result<SavingsTransaction> {
    let kind: String = row.try_get("type")?;
    let kind = SavingsKind::from_str(&kind).ok_or_else(|| {
        sqlx::Error::Decode(format!("unknown savings transaction type: {}", kind).into())
    })?;

    Ok(SavingsTransaction {
        id: row.try_get("id")?,
        rt_id: row.try_get("rt_id")?,
        kind,
        amount: row.try_get("amount")?,
        description: row.try_get("description")?,
        date: row.try_get("date")?,
        created_at: row.try_get("created_at")?,
    })
}

impl LocalDatabase {
    /// Insert a deposit recorded on-device, unsynced, keyed by its local id
    pub async fn insert_waste_transaction_local(&self, tx: &WasteTransaction) -> Result<()> {
        sqlx::query(
            "INSERT INTO waste_transactions (
                id, rt_id, waste_type_id, date, weight, price_per_kg,
                total_value, notes, created_at, synced, local_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(&tx.id)
        .bind(&tx.rt_id)
        .bind(&tx.waste_type_id)
        .bind(&tx.date)
        .bind(tx.weight)
        .bind(tx.price_per_kg)
        .bind(tx.total_value)
        .bind(&tx.notes)
        .bind(&tx.created_at)
        .bind(&tx.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replace-or-insert a deposit by primary key, preserving `local_id`
    pub async fn upsert_waste_transaction(&self, tx: &WasteTransaction, synced: bool) -> Result<()> {
        sqlx::query(
            "INSERT INTO waste_transactions (
                id, rt_id, waste_type_id, date, weight, price_per_kg,
                total_value, notes, created_at, synced
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                rt_id = excluded.rt_id,
                waste_type_id = excluded.waste_type_id,
                date = excluded.date,
                weight = excluded.weight,
                price_per_kg = excluded.price_per_kg,
                total_value = excluded.total_value,
                notes = excluded.notes,
                created_at = excluded.created_at,
                synced = excluded.synced",
        )
        .bind(&tx.id)
        .bind(&tx.rt_id)
        .bind(&tx.waste_type_id)
        .bind(&tx.date)
        .bind(tx.weight)
        .bind(tx.price_per_kg)
        .bind(tx.total_value)
        .bind(&tx.notes)
        .bind(&tx.created_at)
        .bind(synced)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch a deposit by primary key
    pub async fn get_waste_transaction(&self, id: &str) -> Result<Option<WasteTransaction>> {
        let row = sqlx::query("SELECT * FROM waste_transactions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row_to_waste_transaction(&row)?)),
            None => Ok(None),
        }
    }

    /// All deposits, newest first
    pub async fn list_waste_transactions(&self) -> Result<Vec<WasteTransaction>> {
        let rows = sqlx::query("SELECT * FROM waste_transactions ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_waste_transaction).collect()
    }

    /// Rekey a deposit created offline to its server-assigned identity
    pub async fn reconcile_waste_transaction_id(
        &self,
        local_id: &str,
        server: &WasteTransaction,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE waste_transactions SET
                id = ?, rt_id = ?, waste_type_id = ?, date = ?, weight = ?,
                price_per_kg = ?, total_value = ?, notes = ?, created_at = ?,
                synced = 1, local_id = ?
             WHERE id = ?",
        )
        .bind(&server.id)
        .bind(&server.rt_id)
        .bind(&server.waste_type_id)
        .bind(&server.date)
        .bind(server.weight)
        .bind(server.price_per_kg)
        .bind(server.total_value)
        .bind(&server.notes)
        .bind(&server.created_at)
        .bind(local_id)
        .bind(local_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete deposits absent from an authoritative full fetch
    pub async fn prune_waste_transactions_except(&self, keep: &[String]) -> Result<u64> {
        self.prune_table_except("waste_transactions", keep).await
    }

    /// Insert a savings adjustment recorded on-device, unsynced
    pub async fn insert_savings_transaction_local(&self, tx: &SavingsTransaction) -> Result<()> {
        sqlx::query(
            "INSERT INTO savings_transactions (
                id, rt_id, type, amount, description, date, created_at, synced, local_id
            ) VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(&tx.id)
        .bind(&tx.rt_id)
        .bind(tx.kind.as_str())
        .bind(tx.amount)
        .bind(&tx.description)
        .bind(&tx.date)
        .bind(&tx.created_at)
        .bind(&tx.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replace-or-insert a savings adjustment by primary key
    pub async fn upsert_savings_transaction(
        &self,
        tx: &SavingsTransaction,
        synced: bool,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO savings_transactions (
                id, rt_id, type, amount, description, date, created_at, synced
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                rt_id = excluded.rt_id,
                type = excluded.type,
                amount = excluded.amount,
                description = excluded.description,
                date = excluded.date,
                created_at = excluded.created_at,
                synced = excluded.synced",
        )
        .bind(&tx.id)
        .bind(&tx.rt_id)
        .bind(tx.kind.as_str())
        .bind(tx.amount)
        .bind(&tx.description)
        .bind(&tx.date)
        .bind(&tx.created_at)
        .bind(synced)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch a savings adjustment by primary key
    pub async fn get_savings_transaction(&self, id: &str) -> Result<Option<SavingsTransaction>> {
        let row = sqlx::query("SELECT * FROM savings_transactions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row_to_savings_transaction(&row)?)),
            None => Ok(None),
        }
    }

    /// All savings adjustments, newest first
    pub async fn list_savings_transactions(&self) -> Result<Vec<SavingsTransaction>> {
        let rows = sqlx::query("SELECT * FROM savings_transactions ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_savings_transaction).collect()
    }

    /// Rekey a savings adjustment created offline to its server-assigned
    /// identity
    pub async fn reconcile_savings_transaction_id(
        &self,
        local_id: &str,
        server: &SavingsTransaction,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE savings_transactions SET
                id = ?, rt_id = ?, type = ?, amount = ?, description = ?,
                date = ?, created_at = ?, synced = 1, local_id = ?
             WHERE id = ?",
        )
        .bind(&server.id)
        .bind(&server.rt_id)
        .bind(server.kind.as_str())
        .bind(server.amount)
        .bind(&server.description)
        .bind(&server.date)
        .bind(&server.created_at)
        .bind(local_id)
        .bind(local_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete savings adjustments absent from an authoritative full fetch
    pub async fn prune_savings_transactions_except(&self, keep: &[String]) -> Result<u64> {
        self.prune_table_except("savings_transactions", keep).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{generate_local_id, now_rfc3339, today};

    fn sample_deposit(id: &str, created_at: &str) -> WasteTransaction {
        WasteTransaction {
            id: id.to_string(),
            rt_id: "srv-1".to_string(),
            waste_type_id: "wt-1".to_string(),
            date: today(),
            weight: 10.0,
            price_per_kg: 2000.0,
            total_value: 20000.0,
            notes: None,
            created_at: created_at.to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = LocalDatabase::open_in_memory().await.unwrap();
        db.insert_waste_transaction_local(&sample_deposit("a", "2024-01-01T10:00:00Z"))
            .await
            .unwrap();
        db.insert_waste_transaction_local(&sample_deposit("b", "2024-01-02T10:00:00Z"))
            .await
            .unwrap();

        let list = db.list_waste_transactions().await.unwrap();
        assert_eq!(list[0].id, "b");
        assert_eq!(list[1].id, "a");
    }

    #[tokio::test]
    async fn test_reconcile_waste_transaction() {
        let db = LocalDatabase::open_in_memory().await.unwrap();
        let local_id = generate_local_id();
        db.insert_waste_transaction_local(&sample_deposit(&local_id, &now_rfc3339()))
            .await
            .unwrap();

        let server = sample_deposit("srv-tx-1", "2024-03-01T00:00:00Z");
        db.reconcile_waste_transaction_id(&local_id, &server)
            .await
            .unwrap();

        assert!(db.get_waste_transaction(&local_id).await.unwrap().is_none());
        assert!(db.get_waste_transaction("srv-tx-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_savings_round_trip() {
        let db = LocalDatabase::open_in_memory().await.unwrap();
        let tx = SavingsTransaction {
            id: generate_local_id(),
            rt_id: "srv-1".to_string(),
            kind: SavingsKind::Withdrawal,
            amount: 5000.0,
            description: Some("tarik tunai".to_string()),
            date: today(),
            created_at: now_rfc3339(),
        };
        db.insert_savings_transaction_local(&tx).await.unwrap();

        let fetched = db.get_savings_transaction(&tx.id).await.unwrap().unwrap();
        assert_eq!(fetched.kind, SavingsKind::Withdrawal);
        assert_eq!(fetched.amount, 5000.0);
    }
}
