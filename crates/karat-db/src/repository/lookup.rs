//! # Lookup Repository
//!
//! Master data for item forms: categories, metals, stones. Each kind is a
//! flat list of unique values.

use chrono::Utc;
use karat_core::{LookupKind, LookupValue};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Values seeded into an empty database.
const DEFAULT_CATEGORIES: &[&str] = &["Ring", "Necklace", "Bracelet", "Earrings", "Pendant"];
const DEFAULT_METALS: &[&str] = &["Gold 585", "Gold 750", "Silver 925", "Platinum"];
const DEFAULT_STONES: &[&str] = &["Diamond", "Sapphire", "Ruby", "Emerald", "Pearl"];

/// Repository for lookup master data.
#[derive(Debug, Clone)]
pub struct LookupRepository {
    pool: SqlitePool,
}

impl LookupRepository {
    pub fn new(pool: SqlitePool) -> Self {
        LookupRepository { pool }
    }

    /// Adds a value to a lookup list. Duplicates within a kind surface as
    /// [`DbError::UniqueViolation`].
    pub async fn add(&self, kind: LookupKind, value: &str) -> DbResult<LookupValue> {
        let lookup = LookupValue {
            id: Uuid::new_v4().to_string(),
            kind,
            value: value.trim().to_string(),
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO lookup_values (id, kind, value, created_at) VALUES (?, ?, ?, ?)")
            .bind(&lookup.id)
            .bind(kind.as_str())
            .bind(&lookup.value)
            .bind(lookup.created_at)
            .execute(&self.pool)
            .await?;

        Ok(lookup)
    }

    /// Lists all values of one kind, alphabetically.
    pub async fn list(&self, kind: LookupKind) -> DbResult<Vec<LookupValue>> {
        let values = sqlx::query_as::<_, LookupValue>(
            "SELECT id, kind, value, created_at FROM lookup_values WHERE kind = ? ORDER BY value",
        )
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(values)
    }

    /// Removes a lookup value by id. Items referencing the value keep their
    /// text; lookups only feed form dropdowns.
    pub async fn remove(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM lookup_values WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Lookup value", id));
        }

        Ok(())
    }

    /// Seeds the default category/metal/stone lists into an empty table.
    /// No-op when any values already exist.
    pub async fn seed_defaults(&self) -> DbResult<()> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lookup_values")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(());
        }

        for (kind, values) in [
            (LookupKind::Category, DEFAULT_CATEGORIES),
            (LookupKind::Metal, DEFAULT_METALS),
            (LookupKind::Stone, DEFAULT_STONES),
        ] {
            for value in values {
                self.add(kind, value).await?;
            }
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
