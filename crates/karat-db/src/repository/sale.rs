//! # Sale Repository
//!
//! Append-only sales with cost frozen at sale time. The sales processor
//! inserts rows inside its transaction, paired with the guarded stock
//! decrement.

use chrono::{DateTime, Utc};
use karat_core::Sale;
use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::repository::parse_location;

/// Repository for sale history.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

/// Raw row: location comes back as its TEXT key.
#[derive(sqlx::FromRow)]
struct SaleRow {
    id: String,
    item_id: String,
    location: String,
    quantity: i64,
    unit_price_cents: i64,
    cost_snapshot_cents: i64,
    profit_cents: i64,
    recorded_by: String,
    created_at: DateTime<Utc>,
}

impl SaleRow {
    fn into_domain(self) -> DbResult<Sale> {
        Ok(Sale {
            id: self.id,
            item_id: self.item_id,
            location: parse_location(&self.location)?,
            quantity: self.quantity,
            unit_price_cents: self.unit_price_cents,
            cost_snapshot_cents: self.cost_snapshot_cents,
            profit_cents: self.profit_cents,
            recorded_by: self.recorded_by,
            created_at: self.created_at,
        })
    }
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Inserts a sale record inside the processor's transaction.
    pub async fn insert_in<'e, E>(executor: E, sale: &Sale) -> DbResult<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query(
            "INSERT INTO sales (id, item_id, location, quantity, unit_price_cents,
                                cost_snapshot_cents, profit_cents, recorded_by, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&sale.id)
        .bind(&sale.item_id)
        .bind(sale.location.as_key())
        .bind(sale.quantity)
        .bind(sale.unit_price_cents)
        .bind(sale.cost_snapshot_cents)
        .bind(sale.profit_cents)
        .bind(&sale.recorded_by)
        .bind(sale.created_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Most recent sales, newest first.
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            "SELECT id, item_id, location, quantity, unit_price_cents,
                    cost_snapshot_cents, profit_cents, recorded_by, created_at
             FROM sales
             ORDER BY created_at DESC, id DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SaleRow::into_domain).collect()
    }

    /// Sale history for one item, newest first.
    pub async fn list_for_item(&self, item_id: &str, limit: i64) -> DbResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            "SELECT id, item_id, location, quantity, unit_price_cents,
                    cost_snapshot_cents, profit_cents, recorded_by, created_at
             FROM sales
             WHERE item_id = ?
             ORDER BY created_at DESC, id DESC
             LIMIT ?",
        )
        .bind(item_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SaleRow::into_domain).collect()
    }

    /// Number of recorded sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use karat_core::Location;
    use uuid::Uuid;

    async fn test_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query(
            "INSERT INTO items (id, sku, name, category, price_cents, cost_cents,
                                is_active, created_at, updated_at)
             VALUES ('i1', '1000000', 'Ring', 'ring', 1000, 600, 1, ?, ?)",
        )
        .bind(Utc::now())
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn insert_and_list() {
        let db = test_db().await;

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            item_id: "i1".to_string(),
            location: Location::shop("s1"),
            quantity: 2,
            unit_price_cents: 1000,
            cost_snapshot_cents: 600,
            profit_cents: 800,
            recorded_by: "admin".to_string(),
            created_at: Utc::now(),
        };
        SaleRepository::insert_in(db.pool(), &sale).await.unwrap();

        let recent = db.sales().list_recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].location, Location::shop("s1"));
        assert_eq!(recent[0].profit_cents, 800);
        assert_eq!(db.sales().count().await.unwrap(), 1);
    }
}
