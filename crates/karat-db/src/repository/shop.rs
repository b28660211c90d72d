//! # Shop Repository
//!
//! Shops are simple rows; the interesting rule (a shop may only be removed
//! when its stock location is empty) is enforced by the service layer, which
//! checks the location total before calling [`ShopRepository::delete`].

use chrono::Utc;
use karat_core::Shop;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Repository for shop CRUD operations.
#[derive(Debug, Clone)]
pub struct ShopRepository {
    pool: SqlitePool,
}

impl ShopRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ShopRepository { pool }
    }

    /// Creates a shop. Duplicate names surface as [`DbError::UniqueViolation`].
    pub async fn create(&self, name: &str) -> DbResult<Shop> {
        let shop = Shop {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO shops (id, name, created_at) VALUES (?, ?, ?)")
            .bind(&shop.id)
            .bind(&shop.name)
            .bind(shop.created_at)
            .execute(&self.pool)
            .await?;

        Ok(shop)
    }

    /// Gets a shop by its UUID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Shop> {
        sqlx::query_as::<_, Shop>("SELECT id, name, created_at FROM shops WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Shop", id))
    }

    /// Gets a shop by its name (names are unique).
    pub async fn get_by_name(&self, name: &str) -> DbResult<Shop> {
        sqlx::query_as::<_, Shop>("SELECT id, name, created_at FROM shops WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Shop", name))
    }

    /// Lists all shops, alphabetically.
    pub async fn list(&self) -> DbResult<Vec<Shop>> {
        let shops =
            sqlx::query_as::<_, Shop>("SELECT id, name, created_at FROM shops ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(shops)
    }

    /// Renames a shop.
    pub async fn rename(&self, id: &str, new_name: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE shops SET name = ? WHERE id = ?")
            .bind(new_name)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Shop", id));
        }

        Ok(())
    }

    /// Hard-deletes a shop row. The service layer verifies the shop's stock
    /// location is empty first; transfer and sale history references the
    /// location key, not this row, so history survives.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM shops WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Shop", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn create_list_delete() {
        let db = test_db().await;

        let a = db.shops().create("Old Town").await.unwrap();
        db.shops().create("Airport").await.unwrap();

        let shops = db.shops().list().await.unwrap();
        assert_eq!(shops.len(), 2);
        assert_eq!(shops[0].name, "Airport"); // alphabetical

        db.shops().delete(&a.id).await.unwrap();
        assert_eq!(db.shops().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_name_rejected() {
        let db = test_db().await;

        db.shops().create("Old Town").await.unwrap();
        let err = db.shops().create("Old Town").await.unwrap_err();

        assert!(err.is_integrity_violation());
    }

    #[tokio::test]
    async fn lookup_by_name() {
        let db = test_db().await;

        let created = db.shops().create("Old Town").await.unwrap();
        let fetched = db.shops().get_by_name("Old Town").await.unwrap();

        assert_eq!(created.id, fetched.id);
        assert!(db.shops().get_by_name("Nowhere").await.is_err());
    }
}
