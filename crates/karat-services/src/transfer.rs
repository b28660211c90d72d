//! # Transfer Engine
//!
//! Atomic stock movements between locations.
//!
//! ## One Transfer, One Transaction
//! ```text
//! transfer(sku, source, destination, qty)
//!     │
//!     ▼
//! acquire stock lock ─────────────── serializes check-then-mutate
//!     │
//!     ▼
//! BEGIN
//!   resolve SKU → item                 (ItemNotFound)
//!   read quantity at source
//!   guarded decrement at source        (InsufficientStock on shortfall)
//!   increment at destination
//!   insert transfer record
//! COMMIT
//! ```
//! Either every step lands or the transaction rolls back and stock is exactly
//! as before. Total stock of the item across all locations is unchanged by
//! any outcome.

use std::sync::Arc;

use karat_core::{validation, CoreError, Location, Transfer};
use karat_db::repository::item::ItemRepository;
use karat_db::repository::stock::StockRepository;
use karat_db::repository::transfer::TransferRepository;
use karat_db::{Database, DbError};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::context::SessionContext;
use crate::error::{self, ServiceResult};

/// Service for moving stock between the warehouse and shops.
#[derive(Debug, Clone)]
pub struct TransferEngine {
    db: Database,
    stock_lock: Arc<Mutex<()>>,
}

impl TransferEngine {
    pub(crate) fn new(db: Database, stock_lock: Arc<Mutex<()>>) -> Self {
        TransferEngine { db, stock_lock }
    }

    /// Moves stock from the warehouse to a shop.
    pub async fn to_shop(
        &self,
        ctx: &SessionContext,
        sku: &str,
        shop_id: &str,
        quantity: i64,
    ) -> ServiceResult<Transfer> {
        let shop = self
            .db
            .shops()
            .get_by_id(shop_id)
            .await
            .map_err(|e| error::shop_lookup_error(e, shop_id))?;
        self.transfer(ctx, sku, &Location::Warehouse, &shop.location(), quantity)
            .await
    }

    /// Returns stock from a shop to the warehouse.
    pub async fn to_warehouse(
        &self,
        ctx: &SessionContext,
        sku: &str,
        shop_id: &str,
        quantity: i64,
    ) -> ServiceResult<Transfer> {
        let shop = self
            .db
            .shops()
            .get_by_id(shop_id)
            .await
            .map_err(|e| error::shop_lookup_error(e, shop_id))?;
        self.transfer(ctx, sku, &shop.location(), &Location::Warehouse, quantity)
            .await
    }

    /// Moves stock between any two locations.
    ///
    /// ## Errors
    /// * [`CoreError::ItemNotFound`] - SKU matches no active item
    /// * [`CoreError::SameLocation`] - source equals destination
    /// * [`CoreError::InsufficientStock`] - source holds fewer than
    ///   `quantity` units; nothing changes
    #[instrument(skip(self, ctx), fields(operator = %ctx.operator()))]
    pub async fn transfer(
        &self,
        ctx: &SessionContext,
        sku: &str,
        source: &Location,
        destination: &Location,
        quantity: i64,
    ) -> ServiceResult<Transfer> {
        validation::validate_movement_quantity(quantity)?;

        if source == destination {
            return Err(CoreError::SameLocation {
                location: source.clone(),
            }
            .into());
        }

        let _guard = self.stock_lock.lock().await;

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        let item = ItemRepository::fetch_by_sku(&mut *tx, sku)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(sku.to_string()))?;

        let available = StockRepository::quantity(&mut *tx, &item.id, source).await?;
        if available < quantity {
            warn!(
                sku,
                %source,
                available,
                requested = quantity,
                "Transfer rejected: insufficient stock"
            );
            return Err(CoreError::InsufficientStock {
                sku: item.sku,
                location: source.clone(),
                available,
                requested: quantity,
            }
            .into());
        }

        // The guard inside the UPDATE re-checks availability; under the lock
        // it cannot fail, but a false here must still abort.
        let decremented =
            StockRepository::try_decrement(&mut *tx, &item.id, source, quantity).await?;
        if !decremented {
            return Err(CoreError::InsufficientStock {
                sku: item.sku,
                location: source.clone(),
                available,
                requested: quantity,
            }
            .into());
        }

        StockRepository::increment(&mut *tx, &item.id, destination, quantity).await?;

        let transfer = Transfer {
            id: Uuid::new_v4().to_string(),
            item_id: item.id.clone(),
            source: source.clone(),
            destination: destination.clone(),
            quantity,
            recorded_by: ctx.operator().to_string(),
            created_at: chrono::Utc::now(),
        };
        TransferRepository::insert_in(&mut *tx, &transfer).await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            item_id = %transfer.item_id,
            %source,
            %destination,
            quantity,
            "Transfer recorded"
        );
        Ok(transfer)
    }

    /// Recent transfers, newest first.
    pub async fn history(&self, limit: i64) -> ServiceResult<Vec<Transfer>> {
        Ok(self.db.transfers().list_recent(limit).await?)
    }

    /// Movement history for one item.
    pub async fn history_for_item(&self, item_id: &str, limit: i64) -> ServiceResult<Vec<Transfer>> {
        Ok(self.db.transfers().list_for_item(item_id, limit).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Services;
    use karat_core::NewItem;
    use karat_db::DbConfig;

    async fn test_services() -> Services {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Services::new(db)
    }

    async fn seed_item(services: &Services, qty: i64) -> karat_core::Item {
        services
            .inventory()
            .create_item(&NewItem {
                sku: None,
                name: "Gold ring 585".to_string(),
                description: None,
                category: "Ring".to_string(),
                metal: Some("Gold 585".to_string()),
                stone: None,
                weight_grams: Some(2.1),
                price_cents: 129_900,
                cost_cents: 80_000,
                initial_quantity: qty,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn transfer_moves_and_conserves_stock() {
        let services = test_services().await;
        let ctx = SessionContext::new("admin");
        let item = seed_item(&services, 10).await;
        let shop = services.inventory().create_shop("Old Town").await.unwrap();

        services
            .transfers()
            .to_shop(&ctx, &item.sku, &shop.id, 4)
            .await
            .unwrap();

        let inventory = services.inventory();
        assert_eq!(
            inventory.quantity_at(&item.id, &Location::Warehouse).await.unwrap(),
            6
        );
        assert_eq!(
            inventory.quantity_at(&item.id, &shop.location()).await.unwrap(),
            4
        );
        // Conservation: the total across locations never changes.
        assert_eq!(services.db().stock().total_for_item(&item.id).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn overdraw_is_rejected_and_leaves_state_unchanged() {
        let services = test_services().await;
        let ctx = SessionContext::new("admin");
        let item = seed_item(&services, 10).await;
        let shop = services.inventory().create_shop("Old Town").await.unwrap();

        services
            .transfers()
            .to_shop(&ctx, &item.sku, &shop.id, 4)
            .await
            .unwrap();

        // Warehouse holds 6 now; asking for 10 must fail.
        let err = services
            .transfers()
            .to_shop(&ctx, &item.sku, &shop.id, 10)
            .await
            .unwrap_err();
        assert!(err.is_insufficient_stock());
        assert_eq!(
            err.to_string(),
            format!(
                "Insufficient stock for {} at warehouse: available 6, requested 10",
                item.sku
            )
        );

        // Quantities and history are exactly as after the first transfer.
        let inventory = services.inventory();
        assert_eq!(
            inventory.quantity_at(&item.id, &Location::Warehouse).await.unwrap(),
            6
        );
        assert_eq!(
            inventory.quantity_at(&item.id, &shop.location()).await.unwrap(),
            4
        );
        assert_eq!(services.transfers().history(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn return_to_warehouse() {
        let services = test_services().await;
        let ctx = SessionContext::new("admin");
        let item = seed_item(&services, 10).await;
        let shop = services.inventory().create_shop("Old Town").await.unwrap();

        services.transfers().to_shop(&ctx, &item.sku, &shop.id, 4).await.unwrap();
        services.transfers().to_warehouse(&ctx, &item.sku, &shop.id, 3).await.unwrap();

        let inventory = services.inventory();
        assert_eq!(
            inventory.quantity_at(&item.id, &Location::Warehouse).await.unwrap(),
            9
        );
        assert_eq!(
            inventory.quantity_at(&item.id, &shop.location()).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn shop_to_shop_transfer() {
        let services = test_services().await;
        let ctx = SessionContext::new("admin");
        let item = seed_item(&services, 10).await;
        let a = services.inventory().create_shop("Old Town").await.unwrap();
        let b = services.inventory().create_shop("Airport").await.unwrap();

        services.transfers().to_shop(&ctx, &item.sku, &a.id, 5).await.unwrap();
        services
            .transfers()
            .transfer(&ctx, &item.sku, &a.location(), &b.location(), 2)
            .await
            .unwrap();

        let inventory = services.inventory();
        assert_eq!(inventory.quantity_at(&item.id, &a.location()).await.unwrap(), 3);
        assert_eq!(inventory.quantity_at(&item.id, &b.location()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn same_location_is_rejected() {
        let services = test_services().await;
        let ctx = SessionContext::new("admin");
        let item = seed_item(&services, 10).await;

        let err = services
            .transfers()
            .transfer(&ctx, &item.sku, &Location::Warehouse, &Location::Warehouse, 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::ServiceError::Core(CoreError::SameLocation { .. })
        ));
    }

    #[tokio::test]
    async fn unknown_sku_and_bad_quantity() {
        let services = test_services().await;
        let ctx = SessionContext::new("admin");
        let item = seed_item(&services, 10).await;
        let shop = services.inventory().create_shop("Old Town").await.unwrap();

        let err = services
            .transfers()
            .to_shop(&ctx, "9999999", &shop.id, 1)
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        assert!(services
            .transfers()
            .to_shop(&ctx, &item.sku, &shop.id, 0)
            .await
            .is_err());
        assert!(services
            .transfers()
            .to_shop(&ctx, &item.sku, &shop.id, -3)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn transfer_records_operator() {
        let services = test_services().await;
        let ctx = SessionContext::new("clerk");
        let item = seed_item(&services, 5).await;
        let shop = services.inventory().create_shop("Old Town").await.unwrap();

        let transfer = services
            .transfers()
            .to_shop(&ctx, &item.sku, &shop.id, 2)
            .await
            .unwrap();
        assert_eq!(transfer.recorded_by, "clerk");

        let history = services.transfers().history_for_item(&item.id, 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].recorded_by, "clerk");
    }

    #[tokio::test]
    async fn concurrent_transfers_never_overdraw() {
        let services = test_services().await;
        let ctx = SessionContext::new("admin");
        let item = seed_item(&services, 5).await;
        let shop = services.inventory().create_shop("Old Town").await.unwrap();

        // Two transfers of 3 against 5 available: exactly one may succeed.
        let engine = services.transfers();
        let (a, b) = tokio::join!(
            engine.to_shop(&ctx, &item.sku, &shop.id, 3),
            engine.to_shop(&ctx, &item.sku, &shop.id, 3),
        );

        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);

        let failure = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
        assert!(failure.is_insufficient_stock());

        assert_eq!(services.db().stock().total_for_item(&item.id).await.unwrap(), 5);
    }
}
