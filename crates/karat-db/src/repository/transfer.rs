//! # Transfer Repository
//!
//! Append-only movement history. Rows are inserted inside the transfer
//! engine's transaction, alongside the paired stock mutations; there is no
//! update or delete.

use chrono::{DateTime, Utc};
use karat_core::Transfer;
use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::repository::parse_location;

/// Repository for transfer history.
#[derive(Debug, Clone)]
pub struct TransferRepository {
    pool: SqlitePool,
}

/// Raw row: locations come back as TEXT keys.
#[derive(sqlx::FromRow)]
struct TransferRow {
    id: String,
    item_id: String,
    source: String,
    destination: String,
    quantity: i64,
    recorded_by: String,
    created_at: DateTime<Utc>,
}

impl TransferRow {
    fn into_domain(self) -> DbResult<Transfer> {
        Ok(Transfer {
            id: self.id,
            item_id: self.item_id,
            source: parse_location(&self.source)?,
            destination: parse_location(&self.destination)?,
            quantity: self.quantity,
            recorded_by: self.recorded_by,
            created_at: self.created_at,
        })
    }
}

impl TransferRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransferRepository { pool }
    }

    /// Inserts a transfer record inside the engine's transaction.
    pub async fn insert_in<'e, E>(executor: E, transfer: &Transfer) -> DbResult<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query(
            "INSERT INTO transfers (id, item_id, source, destination, quantity,
                                    recorded_by, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&transfer.id)
        .bind(&transfer.item_id)
        .bind(transfer.source.as_key())
        .bind(transfer.destination.as_key())
        .bind(transfer.quantity)
        .bind(&transfer.recorded_by)
        .bind(transfer.created_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Most recent transfers, newest first.
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<Transfer>> {
        let rows = sqlx::query_as::<_, TransferRow>(
            "SELECT id, item_id, source, destination, quantity, recorded_by, created_at
             FROM transfers
             ORDER BY created_at DESC, id DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TransferRow::into_domain).collect()
    }

    /// Movement history for one item, newest first.
    pub async fn list_for_item(&self, item_id: &str, limit: i64) -> DbResult<Vec<Transfer>> {
        let rows = sqlx::query_as::<_, TransferRow>(
            "SELECT id, item_id, source, destination, quantity, recorded_by, created_at
             FROM transfers
             WHERE item_id = ?
             ORDER BY created_at DESC, id DESC
             LIMIT ?",
        )
        .bind(item_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TransferRow::into_domain).collect()
    }

    /// Number of recorded transfers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transfers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
