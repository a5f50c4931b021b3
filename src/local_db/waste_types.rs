//! Waste-category cache operations.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{LocalDatabase, Result};
use crate::model::WasteType;

fn row_to_waste_type(row: &SqliteRow) -> Result<WasteType> {
    Ok(WasteType {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        price_per_kg: row.try_get("price_per_kg")?,
        unit: row.try_get("unit")?,
        description: row.try_get("description")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

impl LocalDatabase {
    /// Replace-or-insert a category by primary key
    pub async fn upsert_waste_type(&self, waste_type: &WasteType, synced: bool) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO waste_types (
                id, name, price_per_kg, unit, description, is_active, created_at, synced
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&waste_type.id)
        .bind(&waste_type.name)
        .bind(waste_type.price_per_kg)
        .bind(&waste_type.unit)
        .bind(&waste_type.description)
        .bind(waste_type.is_active)
        .bind(&waste_type.created_at)
        .bind(synced)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch a category by primary key
    pub async fn get_waste_type(&self, id: &str) -> Result<Option<WasteType>> {
        let row = sqlx::query("SELECT * FROM waste_types WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row_to_waste_type(&row)?)),
            None => Ok(None),
        }
    }

    /// Active categories ordered by name; the local counterpart of the
    /// remote active-only fetch
    pub async fn list_active_waste_types(&self) -> Result<Vec<WasteType>> {
        let rows = sqlx::query("SELECT * FROM waste_types WHERE is_active = 1 ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_waste_type).collect()
    }

    /// All categories, active or not, ordered by name
    pub async fn list_waste_types(&self) -> Result<Vec<WasteType>> {
        let rows = sqlx::query("SELECT * FROM waste_types ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_waste_type).collect()
    }

    /// Number of cached categories
    pub async fn count_waste_types(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM waste_types")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    /// Delete categories absent from an authoritative full fetch
    pub async fn prune_waste_types_except(&self, keep: &[String]) -> Result<u64> {
        self.prune_table_except("waste_types", keep).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::now_rfc3339;

    fn sample_type(id: &str, name: &str, active: bool) -> WasteType {
        WasteType {
            id: id.to_string(),
            name: name.to_string(),
            price_per_kg: 2000.0,
            unit: "kg".to_string(),
            description: None,
            is_active: active,
            created_at: now_rfc3339(),
        }
    }

    #[tokio::test]
    async fn test_active_filter_applied_locally() {
        let db = LocalDatabase::open_in_memory().await.unwrap();
        db.upsert_waste_type(&sample_type("a", "Plastik", true), true)
            .await
            .unwrap();
        db.upsert_waste_type(&sample_type("b", "Kertas", false), true)
            .await
            .unwrap();

        let active = db.list_active_waste_types().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Plastik");

        assert_eq!(db.list_waste_types().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_key() {
        let db = LocalDatabase::open_in_memory().await.unwrap();
        db.upsert_waste_type(&sample_type("a", "Plastik", true), true)
            .await
            .unwrap();

        let mut updated = sample_type("a", "Plastik", true);
        updated.price_per_kg = 2500.0;
        db.upsert_waste_type(&updated, true).await.unwrap();

        assert_eq!(db.count_waste_types().await.unwrap(), 1);
        let fetched = db.get_waste_type("a").await.unwrap().unwrap();
        assert_eq!(fetched.price_per_kg, 2500.0);
    }
}
