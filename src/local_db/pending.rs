//! Pending-sync queue and dead-letter helpers.
//!
//! The queue is replayed oldest first. `increment_retry_count` is a plain
//! read-modify-write; the sync manager's single-flight guard is what makes
//! that safe, so these helpers must only be driven through the manager.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{LocalDatabase, Result};
use crate::model::{Collection, DeadLetter, PendingSync, SyncAction};

fn row_to_pending(row: &SqliteRow) -> Result<Option<PendingSync>> {
    let collection: String = row.try_get("collection")?;
    let action: String = row.try_get("action")?;
    let payload: String = row.try_get("payload")?;

    // Unknown collections/actions or malformed payloads are skipped, not
    // fatal; the rows stay in the table but are never replayed.
    let (Some(collection), Some(action)) = (
        Collection::from_table_name(&collection),
        SyncAction::from_str(&action),
    ) else {
        return Ok(None);
    };
    let Ok(payload) = serde_json::from_str(&payload) else {
        return Ok(None);
    };

    Ok(Some(PendingSync {
        id: row.try_get("id")?,
        collection,
        action,
        payload,
        timestamp: row.try_get("timestamp")?,
        retry_count: row.try_get("retry_count")?,
    }))
}

impl LocalDatabase {
    /// Enqueue a mutation that could not be confirmed against the remote.
    ///
    /// Assigns a fresh identifier and a zero retry count; returns the entry
    /// id.
    pub async fn add_pending_sync(
        &self,
        collection: Collection,
        action: SyncAction,
        payload: &serde_json::Value,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let payload_text = payload.to_string();

        sqlx::query(
            "INSERT INTO pending_sync (id, collection, action, payload, timestamp, retry_count)
             VALUES (?, ?, ?, ?, ?, 0)",
        )
        .bind(&id)
        .bind(collection.table_name())
        .bind(action.as_str())
        .bind(&payload_text)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// All pending entries in enqueue order.
    ///
    /// Rowid breaks ties between entries enqueued within the same
    /// millisecond.
    pub async fn get_pending_sync(&self) -> Result<Vec<PendingSync>> {
        let rows = sqlx::query(
            "SELECT id, collection, action, payload, timestamp, retry_count
             FROM pending_sync
             ORDER BY timestamp ASC, rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::new();
        for row in rows {
            if let Some(entry) = row_to_pending(&row)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Number of queued entries
    pub async fn pending_sync_count(&self) -> Result<u64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pending_sync")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0 as u64)
    }

    /// Delete an entry after successful replay
    pub async fn remove_pending_sync(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM pending_sync WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Bump an entry's retry counter; returns the new count
    pub async fn increment_retry_count(&self, id: &str) -> Result<i64> {
        let current: Option<(i64,)> =
            sqlx::query_as("SELECT retry_count FROM pending_sync WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let new_count = current.map(|(c,)| c + 1).unwrap_or(0);
        sqlx::query("UPDATE pending_sync SET retry_count = ? WHERE id = ?")
            .bind(new_count)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(new_count)
    }

    /// Move an entry whose retry budget is exhausted into the dead-letter
    /// table. The local mutation stays applied; the entry is retained for
    /// inspection rather than deleted outright.
    pub async fn move_to_dead_letter(&self, id: &str, last_error: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO dead_letter (
                id, collection, action, payload, timestamp, retry_count,
                discarded_at, last_error
            )
            SELECT id, collection, action, payload, timestamp, retry_count, ?, ?
            FROM pending_sync WHERE id = ?",
        )
        .bind(crate::model::now_rfc3339())
        .bind(last_error)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.remove_pending_sync(id).await
    }

    /// Discarded entries, oldest first
    pub async fn get_dead_letters(&self) -> Result<Vec<DeadLetter>> {
        let rows = sqlx::query(
            "SELECT id, collection, action, payload, timestamp, retry_count,
                    discarded_at, last_error
             FROM dead_letter
             ORDER BY timestamp ASC, rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::new();
        for row in rows {
            let collection: String = row.try_get("collection")?;
            let action: String = row.try_get("action")?;
            let payload: String = row.try_get("payload")?;

            let (Some(collection), Some(action)) = (
                Collection::from_table_name(&collection),
                SyncAction::from_str(&action),
            ) else {
                continue;
            };
            let Ok(payload) = serde_json::from_str(&payload) else {
                continue;
            };

            entries.push(DeadLetter {
                id: row.try_get("id")?,
                collection,
                action,
                payload,
                timestamp: row.try_get("timestamp")?,
                retry_count: row.try_get("retry_count")?,
                discarded_at: row.try_get("discarded_at")?,
                last_error: row.try_get("last_error")?,
            });
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_enqueue_and_order() {
        let db = LocalDatabase::open_in_memory().await.unwrap();

        db.add_pending_sync(Collection::Rt, SyncAction::Create, &json!({"nomor": "001"}))
            .await
            .unwrap();
        db.add_pending_sync(Collection::Rt, SyncAction::Create, &json!({"nomor": "002"}))
            .await
            .unwrap();
        db.add_pending_sync(Collection::Rt, SyncAction::Create, &json!({"nomor": "003"}))
            .await
            .unwrap();

        let entries = db.get_pending_sync().await.unwrap();
        let numbers: Vec<&str> = entries
            .iter()
            .map(|e| e.payload["nomor"].as_str().unwrap())
            .collect();
        assert_eq!(numbers, vec!["001", "002", "003"]);
    }

    #[tokio::test]
    async fn test_remove_after_success() {
        let db = LocalDatabase::open_in_memory().await.unwrap();
        let id = db
            .add_pending_sync(Collection::Rt, SyncAction::Delete, &json!({"id": "srv-1"}))
            .await
            .unwrap();

        assert_eq!(db.pending_sync_count().await.unwrap(), 1);
        db.remove_pending_sync(&id).await.unwrap();
        assert_eq!(db.pending_sync_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_increment_retry_count() {
        let db = LocalDatabase::open_in_memory().await.unwrap();
        let id = db
            .add_pending_sync(Collection::Rt, SyncAction::Update, &json!({"id": "srv-1"}))
            .await
            .unwrap();

        assert_eq!(db.increment_retry_count(&id).await.unwrap(), 1);
        assert_eq!(db.increment_retry_count(&id).await.unwrap(), 2);
        assert_eq!(db.increment_retry_count(&id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_dead_letter_retains_entry() {
        let db = LocalDatabase::open_in_memory().await.unwrap();
        let payload = json!({"id": "srv-1"});
        let id = db
            .add_pending_sync(Collection::Rt, SyncAction::Delete, &payload)
            .await
            .unwrap();

        db.move_to_dead_letter(&id, "remote returned 503").await.unwrap();

        assert_eq!(db.pending_sync_count().await.unwrap(), 0);
        let dead = db.get_dead_letters().await.unwrap();
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].id, id);
        assert_eq!(dead[0].payload, payload);
        assert_eq!(dead[0].last_error.as_deref(), Some("remote returned 503"));
    }

    #[tokio::test]
    async fn test_unknown_collection_skipped() {
        let db = LocalDatabase::open_in_memory().await.unwrap();

        sqlx::query(
            "INSERT INTO pending_sync (id, collection, action, payload, timestamp, retry_count)
             VALUES ('x', 'mystery_table', 'create', '{}', 0, 0)",
        )
        .execute(db.pool())
        .await
        .unwrap();

        assert!(db.get_pending_sync().await.unwrap().is_empty());
        // still counted; it occupies the queue until cleared
        assert_eq!(db.pending_sync_count().await.unwrap(), 1);
    }
}
