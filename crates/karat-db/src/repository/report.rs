//! # Report Repository
//!
//! Read-only aggregation queries for the reporting screens: sales by period
//! with profit totals, and the cross-location stock overview.
//!
//! Report rows are purpose-built structs rather than domain types; they are
//! serialized straight to the presentation layer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::DbResult;

/// One sale line in a period report, joined with item details.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SalesReportRow {
    pub sale_id: String,
    pub sku: String,
    pub item_name: String,
    pub location: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub profit_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// Aggregate totals for a period.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SalesSummary {
    pub sale_count: i64,
    pub units_sold: i64,
    pub revenue_cents: i64,
    pub profit_cents: i64,
}

/// One line in the stock overview: an item's quantity at one location.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StockReportRow {
    pub sku: String,
    pub item_name: String,
    pub location: String,
    /// Shop name when the location is a shop, `None` for the warehouse.
    pub shop_name: Option<String>,
    pub quantity: i64,
    pub price_cents: i64,
}

/// Repository for reporting queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Sale lines within an optional [from, to) period, newest first.
    ///
    /// `NULL` bounds are open: `(None, None)` is the all-time report.
    pub async fn sales_report(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<SalesReportRow>> {
        let rows = sqlx::query_as::<_, SalesReportRow>(
            "SELECT s.id AS sale_id, i.sku, i.name AS item_name, s.location,
                    s.quantity, s.unit_price_cents, s.profit_cents, s.created_at
             FROM sales s
             JOIN items i ON i.id = s.item_id
             WHERE (?1 IS NULL OR s.created_at >= ?1)
               AND (?2 IS NULL OR s.created_at < ?2)
             ORDER BY s.created_at DESC, s.id DESC",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Aggregate revenue and profit within an optional [from, to) period.
    pub async fn sales_summary(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> DbResult<SalesSummary> {
        let summary = sqlx::query_as::<_, SalesSummary>(
            "SELECT COUNT(*) AS sale_count,
                    COALESCE(SUM(quantity), 0) AS units_sold,
                    COALESCE(SUM(unit_price_cents * quantity), 0) AS revenue_cents,
                    COALESCE(SUM(profit_cents), 0) AS profit_cents
             FROM sales
             WHERE (?1 IS NULL OR created_at >= ?1)
               AND (?2 IS NULL OR created_at < ?2)",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }

    /// Every non-zero stock level, joined with item and shop names.
    ///
    /// The LEFT JOIN resolves `shop:<id>` keys to shop names; warehouse rows
    /// come back with `shop_name = NULL`.
    pub async fn stock_report(&self) -> DbResult<Vec<StockReportRow>> {
        let rows = sqlx::query_as::<_, StockReportRow>(
            "SELECT i.sku, i.name AS item_name, sl.location, sh.name AS shop_name,
                    sl.quantity, i.price_cents
             FROM stock_levels sl
             JOIN items i ON i.id = sl.item_id
             LEFT JOIN shops sh ON sl.location = 'shop:' || sh.id
             WHERE sl.quantity > 0 AND i.is_active = 1
             ORDER BY i.sku, sl.location",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
