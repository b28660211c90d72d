//! # Item Repository
//!
//! CRUD for jewelry items plus SKU sequence allocation.
//!
//! Items are soft-deleted: `soft_delete` flips `is_active` off and the item
//! disappears from listings, but sales and transfers keep their foreign keys.

use chrono::Utc;
use karat_core::Item;
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};

/// Repository for item CRUD operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

const ITEM_COLUMNS: &str = "id, sku, name, description, category, metal, stone, \
                            weight_grams, price_cents, cost_cents, is_active, \
                            created_at, updated_at";

impl ItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    // =========================================================================
    // Transaction Primitives (executor-generic)
    // =========================================================================

    /// Allocates the next value from the SKU sequence.
    ///
    /// `RETURNING` makes the bump-and-read a single statement, so two
    /// concurrent allocations can never observe the same value.
    pub async fn allocate_sku_in<'e, E>(executor: E) -> DbResult<i64>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let seq: i64 = sqlx::query_scalar(
            "UPDATE sku_sequence SET next_val = next_val + 1
             WHERE id = 1
             RETURNING next_val - 1",
        )
        .fetch_one(executor)
        .await?;

        Ok(seq)
    }

    /// Inserts a fully-built item row.
    ///
    /// A duplicate SKU surfaces as [`DbError::UniqueViolation`].
    pub async fn insert_in<'e, E>(executor: E, item: &Item) -> DbResult<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query(
            "INSERT INTO items (id, sku, name, description, category, metal, stone,
                                weight_grams, price_cents, cost_cents, is_active,
                                created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&item.id)
        .bind(&item.sku)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.category)
        .bind(&item.metal)
        .bind(&item.stone)
        .bind(item.weight_grams)
        .bind(item.price_cents)
        .bind(item.cost_cents)
        .bind(item.is_active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Fetches an active item by SKU inside a transaction.
    pub async fn fetch_by_sku<'e, E>(executor: E, sku: &str) -> DbResult<Option<Item>>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let item = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE sku = ? AND is_active = 1"
        ))
        .bind(sku)
        .fetch_optional(executor)
        .await?;

        Ok(item)
    }

    // =========================================================================
    // Pool Operations
    // =========================================================================

    /// Gets an item by its UUID, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Item> {
        sqlx::query_as::<_, Item>(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))
    }

    /// Gets an active item by SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Item> {
        Self::fetch_by_sku(&self.pool, sku)
            .await?
            .ok_or_else(|| DbError::not_found("Item", sku))
    }

    /// Lists active items, newest first.
    pub async fn list_active(&self, limit: i64) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE is_active = 1
             ORDER BY created_at DESC
             LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Case-insensitive substring search over name, SKU, category, metal and
    /// stone. An exact SKU match sorts first so barcode scans resolve
    /// predictably even when the payload is a substring of other SKUs.
    pub async fn search(&self, query: &str, limit: i64) -> DbResult<Vec<Item>> {
        let pattern = format!("%{}%", query);

        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE is_active = 1
               AND (sku LIKE ?1
                    OR name LIKE ?1
                    OR category LIKE ?1
                    OR metal LIKE ?1
                    OR stone LIKE ?1)
             ORDER BY (sku = ?2) DESC, name
             LIMIT ?3"
        ))
        .bind(&pattern)
        .bind(query)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Updates an item's mutable fields. SKU and id never change.
    pub async fn update(&self, item: &Item) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE items
             SET name = ?, description = ?, category = ?, metal = ?, stone = ?,
                 weight_grams = ?, price_cents = ?, cost_cents = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.category)
        .bind(&item.metal)
        .bind(&item.stone)
        .bind(item.weight_grams)
        .bind(item.price_cents)
        .bind(item.cost_cents)
        .bind(Utc::now())
        .bind(&item.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", &item.id));
        }

        Ok(())
    }

    /// Soft-deletes an item.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE items SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        Ok(())
    }

    /// Number of active items.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE is_active = 1")
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
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn ring(sku: &str, name: &str) -> Item {
        let now = Utc::now();
        Item {
            id: Uuid::new_v4().to_string(),
            sku: sku.to_string(),
            name: name.to_string(),
            description: None,
            category: "ring".to_string(),
            metal: Some("Gold 585".to_string()),
            stone: None,
            weight_grams: Some(2.1),
            price_cents: 129_900,
            cost_cents: 80_000,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    async fn insert(db: &Database, item: &Item) -> DbResult<()> {
        ItemRepository::insert_in(db.pool(), item).await
    }

    #[tokio::test]
    async fn sku_sequence_starts_at_one_million() {
        let db = test_db().await;

        let first = ItemRepository::allocate_sku_in(db.pool()).await.unwrap();
        let second = ItemRepository::allocate_sku_in(db.pool()).await.unwrap();

        assert_eq!(first, 1_000_000);
        assert_eq!(second, 1_000_001);
    }

    #[tokio::test]
    async fn insert_and_fetch() {
        let db = test_db().await;

        let item = ring("1000000", "Gold ring");
        insert(&db, &item).await.unwrap();

        let by_id = db.items().get_by_id(&item.id).await.unwrap();
        assert_eq!(by_id.sku, "1000000");

        let by_sku = db.items().get_by_sku("1000000").await.unwrap();
        assert_eq!(by_sku.id, item.id);
    }

    #[tokio::test]
    async fn duplicate_sku_is_unique_violation() {
        let db = test_db().await;

        insert(&db, &ring("1000000", "First")).await.unwrap();
        let err = insert(&db, &ring("1000000", "Second")).await.unwrap_err();

        assert!(err.is_integrity_violation());
    }

    #[tokio::test]
    async fn soft_delete_hides_from_sku_lookup() {
        let db = test_db().await;

        let item = ring("1000000", "Ring");
        insert(&db, &item).await.unwrap();
        db.items().soft_delete(&item.id).await.unwrap();

        // SKU lookup only sees active items; id lookup keeps working.
        assert!(db.items().get_by_sku("1000000").await.is_err());
        let fetched = db.items().get_by_id(&item.id).await.unwrap();
        assert!(!fetched.is_active);
        assert_eq!(db.items().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn search_prefers_exact_sku() {
        let db = test_db().await;

        insert(&db, &ring("1000042", "Plain band")).await.unwrap();
        insert(&db, &ring("91000042X", "Other")).await.unwrap();

        let hits = db.items().search("1000042", 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].sku, "1000042");
    }

    #[tokio::test]
    async fn search_by_name_fragment() {
        let db = test_db().await;

        insert(&db, &ring("1000000", "Sapphire pendant")).await.unwrap();
        insert(&db, &ring("1000001", "Plain band")).await.unwrap();

        let hits = db.items().search("sapphire", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Sapphire pendant");
    }
}
