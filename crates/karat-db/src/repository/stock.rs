//! # Stock Repository
//!
//! On-hand quantities per (item, location) pair.
//!
//! ## Mutation Primitives
//! ```text
//! Service transaction
//!      │
//!      ├── StockRepository::quantity(&mut *tx, ...)       read current
//!      ├── StockRepository::try_decrement(&mut *tx, ...)  guarded UPDATE
//!      └── StockRepository::increment(&mut *tx, ...)      upsert
//! ```
//! `try_decrement` is the only way stock goes down. Its WHERE clause repeats
//! the availability check inside the UPDATE itself, and the table's
//! `CHECK (quantity >= 0)` backs it up. Non-negative stock holds even if a
//! caller forgets the engine lock.

use chrono::Utc;
use karat_core::{Location, StockLevel};
use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::repository::parse_location;

/// Repository for stock-level reads and guarded mutations.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

/// Raw row: location comes back as its TEXT key.
#[derive(sqlx::FromRow)]
struct StockLevelRow {
    item_id: String,
    location: String,
    quantity: i64,
    updated_at: chrono::DateTime<Utc>,
}

impl StockLevelRow {
    fn into_domain(self) -> DbResult<StockLevel> {
        Ok(StockLevel {
            item_id: self.item_id,
            location: parse_location(&self.location)?,
            quantity: self.quantity,
            updated_at: self.updated_at,
        })
    }
}

impl StockRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    // =========================================================================
    // Transaction Primitives (executor-generic)
    // =========================================================================

    /// Returns the on-hand quantity of an item at a location.
    ///
    /// A missing row counts as zero: locations with no history of the item
    /// simply hold none of it.
    pub async fn quantity<'e, E>(executor: E, item_id: &str, location: &Location) -> DbResult<i64>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let qty: Option<i64> = sqlx::query_scalar(
            "SELECT quantity FROM stock_levels WHERE item_id = ? AND location = ?",
        )
        .bind(item_id)
        .bind(location.as_key())
        .fetch_optional(executor)
        .await?;

        Ok(qty.unwrap_or(0))
    }

    /// Attempts to decrement stock, failing atomically if not enough is
    /// available.
    ///
    /// ## Returns
    /// * `Ok(true)` - stock was decremented
    /// * `Ok(false)` - insufficient stock; nothing changed
    pub async fn try_decrement<'e, E>(
        executor: E,
        item_id: &str,
        location: &Location,
        quantity: i64,
    ) -> DbResult<bool>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        // The availability check rides inside the UPDATE: zero rows affected
        // means the guard failed and the row is untouched.
        let result = sqlx::query(
            "UPDATE stock_levels
             SET quantity = quantity - ?, updated_at = ?
             WHERE item_id = ? AND location = ? AND quantity >= ?",
        )
        .bind(quantity)
        .bind(Utc::now())
        .bind(item_id)
        .bind(location.as_key())
        .bind(quantity)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Adds stock at a location, creating the row if needed.
    pub async fn increment<'e, E>(
        executor: E,
        item_id: &str,
        location: &Location,
        quantity: i64,
    ) -> DbResult<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query(
            "INSERT INTO stock_levels (item_id, location, quantity, updated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (item_id, location)
             DO UPDATE SET quantity = quantity + excluded.quantity,
                           updated_at = excluded.updated_at",
        )
        .bind(item_id)
        .bind(location.as_key())
        .bind(quantity)
        .bind(Utc::now())
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Sets an absolute quantity (initial stock, manual correction after an
    /// audit). Negative values are rejected upstream and by the CHECK.
    pub async fn set_quantity<'e, E>(
        executor: E,
        item_id: &str,
        location: &Location,
        quantity: i64,
    ) -> DbResult<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query(
            "INSERT INTO stock_levels (item_id, location, quantity, updated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (item_id, location)
             DO UPDATE SET quantity = excluded.quantity,
                           updated_at = excluded.updated_at",
        )
        .bind(item_id)
        .bind(location.as_key())
        .bind(quantity)
        .bind(Utc::now())
        .execute(executor)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Pool Reads
    // =========================================================================

    /// Returns the on-hand quantity against the pool (read outside any
    /// transaction).
    pub async fn quantity_of(&self, item_id: &str, location: &Location) -> DbResult<i64> {
        Self::quantity(&self.pool, item_id, location).await
    }

    /// All stock levels for one item, across locations. Zero rows are not
    /// materialized.
    pub async fn levels_for_item(&self, item_id: &str) -> DbResult<Vec<StockLevel>> {
        let rows = sqlx::query_as::<_, StockLevelRow>(
            "SELECT item_id, location, quantity, updated_at
             FROM stock_levels
             WHERE item_id = ?
             ORDER BY location",
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StockLevelRow::into_domain).collect()
    }

    /// All non-zero stock levels at one location.
    pub async fn levels_at_location(&self, location: &Location) -> DbResult<Vec<StockLevel>> {
        let rows = sqlx::query_as::<_, StockLevelRow>(
            "SELECT item_id, location, quantity, updated_at
             FROM stock_levels
             WHERE location = ? AND quantity > 0
             ORDER BY item_id",
        )
        .bind(location.as_key())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StockLevelRow::into_domain).collect()
    }

    /// Total units held at a location, across all items.
    pub async fn total_at_location(&self, location: &Location) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0) FROM stock_levels WHERE location = ?",
        )
        .bind(location.as_key())
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Total units of one item across every location. Used by conservation
    /// checks and the stock report.
    pub async fn total_for_item(&self, item_id: &str) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0) FROM stock_levels WHERE item_id = ?",
        )
        .bind(item_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
