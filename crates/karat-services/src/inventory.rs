//! # Inventory Service
//!
//! Item and shop management plus manual stock corrections.
//!
//! Item creation is transactional: SKU allocation (when no manual SKU is
//! given), the item row, and the initial warehouse stock either all land or
//! none do. Shop deletion refuses while the shop's location still holds
//! stock.

use std::sync::Arc;

use karat_core::{validation, CoreError, Item, Location, NewItem, Shop, StockLevel};
use karat_db::repository::item::ItemRepository;
use karat_db::repository::stock::StockRepository;
use karat_db::{Database, DbError};
use tokio::sync::Mutex;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::context::SessionContext;
use crate::error::{self, ServiceResult};

/// Service for item, shop and stock management.
#[derive(Debug, Clone)]
pub struct InventoryService {
    db: Database,
    stock_lock: Arc<Mutex<()>>,
}

impl InventoryService {
    pub(crate) fn new(db: Database, stock_lock: Arc<Mutex<()>>) -> Self {
        InventoryService { db, stock_lock }
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Creates an item, allocating a SKU from the sequence when none is
    /// given, and places its initial quantity at the warehouse.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create_item(&self, new: &NewItem) -> ServiceResult<Item> {
        validation::validate_item_name(&new.name)?;
        validation::validate_price_cents(new.price_cents)?;
        validation::validate_price_cents(new.cost_cents)?;
        validation::validate_stock_quantity(new.initial_quantity)?;
        if let Some(sku) = &new.sku {
            validation::validate_sku(sku)?;
        }
        if let Some(weight) = new.weight_grams {
            validation::validate_weight_grams(weight)?;
        }

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        let sku = match &new.sku {
            Some(sku) => sku.trim().to_string(),
            None => {
                let seq = ItemRepository::allocate_sku_in(&mut *tx).await?;
                karat_core::barcode::sku_from_sequence(seq)
            }
        };

        let now = chrono::Utc::now();
        let item = Item {
            id: Uuid::new_v4().to_string(),
            sku,
            name: new.name.trim().to_string(),
            description: new.description.clone(),
            category: new.category.clone(),
            metal: new.metal.clone(),
            stone: new.stone.clone(),
            weight_grams: new.weight_grams,
            price_cents: new.price_cents,
            cost_cents: new.cost_cents,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        ItemRepository::insert_in(&mut *tx, &item).await?;

        if new.initial_quantity > 0 {
            StockRepository::set_quantity(&mut *tx, &item.id, &Location::Warehouse, new.initial_quantity)
                .await?;
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(sku = %item.sku, "Item created");
        Ok(item)
    }

    /// Gets an item by UUID.
    pub async fn get_item(&self, id: &str) -> ServiceResult<Item> {
        Ok(self.db.items().get_by_id(id).await?)
    }

    /// Resolves a scanned or typed SKU to an active item.
    pub async fn find_by_sku(&self, sku: &str) -> ServiceResult<Item> {
        ItemRepository::fetch_by_sku(self.db.pool(), sku)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(sku.to_string()).into())
    }

    /// Lists active items, newest first.
    pub async fn list_items(&self, limit: i64) -> ServiceResult<Vec<Item>> {
        Ok(self.db.items().list_active(limit).await?)
    }

    /// Searches active items by SKU, name, category, metal or stone.
    pub async fn search_items(&self, query: &str, limit: i64) -> ServiceResult<Vec<Item>> {
        let query = validation::validate_search_query(query)?;
        if query.is_empty() {
            return self.list_items(limit).await;
        }
        Ok(self.db.items().search(&query, limit).await?)
    }

    /// Updates an item's mutable fields.
    pub async fn update_item(&self, item: &Item) -> ServiceResult<()> {
        validation::validate_item_name(&item.name)?;
        validation::validate_price_cents(item.price_cents)?;
        validation::validate_price_cents(item.cost_cents)?;
        if let Some(weight) = item.weight_grams {
            validation::validate_weight_grams(weight)?;
        }

        self.db.items().update(item).await?;
        Ok(())
    }

    /// Retires an item. History stays; the item vanishes from listings and
    /// SKU lookups.
    pub async fn retire_item(&self, id: &str) -> ServiceResult<()> {
        self.db.items().soft_delete(id).await?;
        info!(item_id = %id, "Item retired");
        Ok(())
    }

    // =========================================================================
    // Stock
    // =========================================================================

    /// On-hand quantity of one item at one location.
    pub async fn quantity_at(&self, item_id: &str, location: &Location) -> ServiceResult<i64> {
        Ok(self.db.stock().quantity_of(item_id, location).await?)
    }

    /// All of one item's stock levels across locations.
    pub async fn stock_for_item(&self, item_id: &str) -> ServiceResult<Vec<StockLevel>> {
        Ok(self.db.stock().levels_for_item(item_id).await?)
    }

    /// Non-zero stock levels at one location.
    pub async fn stock_at(&self, location: &Location) -> ServiceResult<Vec<StockLevel>> {
        Ok(self.db.stock().levels_at_location(location).await?)
    }

    /// Sets an absolute quantity at a location (manual correction, e.g.
    /// after an audit found a discrepancy).
    ///
    /// Takes the stock lock: a correction must not interleave with a
    /// transfer's or sale's check-then-mutate.
    #[instrument(skip(self, ctx), fields(operator = %ctx.operator()))]
    pub async fn correct_stock(
        &self,
        ctx: &SessionContext,
        item_id: &str,
        location: &Location,
        quantity: i64,
    ) -> ServiceResult<()> {
        validation::validate_stock_quantity(quantity)?;

        let _guard = self.stock_lock.lock().await;

        // Verify the item exists so a typo'd id doesn't create orphan stock.
        self.db.items().get_by_id(item_id).await?;
        StockRepository::set_quantity(self.db.pool(), item_id, location, quantity).await?;

        info!(item_id, %location, quantity, "Stock corrected");
        Ok(())
    }

    // =========================================================================
    // Shops
    // =========================================================================

    /// Creates a shop.
    pub async fn create_shop(&self, name: &str) -> ServiceResult<Shop> {
        validation::validate_shop_name(name)?;
        let shop = self.db.shops().create(name.trim()).await?;
        info!(shop = %shop.name, "Shop created");
        Ok(shop)
    }

    /// Gets a shop by UUID.
    pub async fn get_shop(&self, id: &str) -> ServiceResult<Shop> {
        self.db
            .shops()
            .get_by_id(id)
            .await
            .map_err(|e| error::shop_lookup_error(e, id))
    }

    /// Lists all shops.
    pub async fn list_shops(&self) -> ServiceResult<Vec<Shop>> {
        Ok(self.db.shops().list().await?)
    }

    /// Deletes a shop, refusing while its location still holds stock.
    ///
    /// Remaining units must be transferred back to the warehouse first.
    pub async fn delete_shop(&self, id: &str) -> ServiceResult<()> {
        let _guard = self.stock_lock.lock().await;

        let shop = self
            .db
            .shops()
            .get_by_id(id)
            .await
            .map_err(|e| error::shop_lookup_error(e, id))?;
        let units = self.db.stock().total_at_location(&shop.location()).await?;
        if units > 0 {
            return Err(CoreError::ShopNotEmpty {
                name: shop.name,
                units,
            }
            .into());
        }

        self.db.shops().delete(id).await?;
        info!(shop = %shop.name, "Shop deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Services;
    use karat_db::DbConfig;

    async fn test_services() -> Services {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Services::new(db)
    }

    fn ring(qty: i64) -> NewItem {
        NewItem {
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
        }
    }

    #[tokio::test]
    async fn create_item_allocates_sku_and_places_stock() {
        let services = test_services().await;
        let inventory = services.inventory();

        let item = inventory.create_item(&ring(10)).await.unwrap();

        assert_eq!(item.sku, "1000000");
        assert_eq!(
            inventory.quantity_at(&item.id, &Location::Warehouse).await.unwrap(),
            10
        );

        let next = inventory.create_item(&ring(0)).await.unwrap();
        assert_eq!(next.sku, "1000001");
    }

    #[tokio::test]
    async fn manual_sku_is_kept() {
        let services = test_services().await;

        let mut new = ring(0);
        new.sku = Some("RING-585-001".to_string());
        let item = services.inventory().create_item(&new).await.unwrap();

        assert_eq!(item.sku, "RING-585-001");
    }

    #[tokio::test]
    async fn duplicate_sku_is_integrity_violation() {
        let services = test_services().await;
        let inventory = services.inventory();

        let mut new = ring(0);
        new.sku = Some("RING-001".to_string());
        inventory.create_item(&new).await.unwrap();

        let err = inventory.create_item(&new).await.unwrap_err();
        assert!(err.is_integrity_violation());
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_any_write() {
        let services = test_services().await;
        let inventory = services.inventory();

        let mut new = ring(0);
        new.initial_quantity = -1;
        assert!(inventory.create_item(&new).await.is_err());

        let mut new = ring(0);
        new.name = String::new();
        assert!(inventory.create_item(&new).await.is_err());

        // Nothing was created, and the SKU sequence was never bumped.
        assert!(inventory.list_items(10).await.unwrap().is_empty());
        let item = inventory.create_item(&ring(0)).await.unwrap();
        assert_eq!(item.sku, "1000000");
    }

    #[tokio::test]
    async fn find_by_sku_maps_to_item_not_found() {
        let services = test_services().await;

        let err = services.inventory().find_by_sku("1009999").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn retired_items_leave_sku_lookups() {
        let services = test_services().await;
        let inventory = services.inventory();

        let item = inventory.create_item(&ring(0)).await.unwrap();
        inventory.retire_item(&item.id).await.unwrap();

        assert!(inventory.find_by_sku(&item.sku).await.is_err());
        assert!(inventory.list_items(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn shop_with_stock_cannot_be_deleted() {
        let services = test_services().await;
        let inventory = services.inventory();
        let ctx = SessionContext::new("admin");

        let item = inventory.create_item(&ring(10)).await.unwrap();
        let shop = inventory.create_shop("Old Town").await.unwrap();

        services
            .transfers()
            .to_shop(&ctx, &item.sku, &shop.id, 4)
            .await
            .unwrap();

        let err = inventory.delete_shop(&shop.id).await.unwrap_err();
        assert!(matches!(
            err,
            crate::ServiceError::Core(CoreError::ShopNotEmpty { units: 4, .. })
        ));

        // Empty it and deletion goes through.
        services
            .transfers()
            .to_warehouse(&ctx, &item.sku, &shop.id, 4)
            .await
            .unwrap();
        inventory.delete_shop(&shop.id).await.unwrap();
    }

    #[tokio::test]
    async fn emptied_shop_deletes_even_after_stock_take() {
        let services = test_services().await;
        let inventory = services.inventory();
        let ctx = SessionContext::new("admin");

        let item = inventory.create_item(&ring(10)).await.unwrap();
        let shop = inventory.create_shop("Old Town").await.unwrap();

        services.transfers().to_shop(&ctx, &item.sku, &shop.id, 2).await.unwrap();
        services
            .audits()
            .run_stock_take(
                &ctx,
                &shop.id,
                &[crate::ScannedLine {
                    sku: item.sku.clone(),
                    count: 2,
                }],
            )
            .await
            .unwrap();
        services.transfers().to_warehouse(&ctx, &item.sku, &shop.id, 2).await.unwrap();

        // Recorded stock-takes must not pin the emptied shop in place.
        inventory.delete_shop(&shop.id).await.unwrap();

        // The audit history survives, with the shop name snapshotted.
        let sessions = services.audits().sessions(10).await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].shop_name, "Old Town");
    }

    #[tokio::test]
    async fn unknown_shop_surfaces_shop_not_found() {
        let services = test_services().await;
        let inventory = services.inventory();

        let err = inventory.get_shop("no-such-shop").await.unwrap_err();
        assert!(matches!(
            err,
            crate::ServiceError::Core(CoreError::ShopNotFound(_))
        ));

        let err = inventory.delete_shop("no-such-shop").await.unwrap_err();
        assert!(matches!(
            err,
            crate::ServiceError::Core(CoreError::ShopNotFound(_))
        ));
    }

    #[tokio::test]
    async fn stock_correction_sets_absolute_quantity() {
        let services = test_services().await;
        let inventory = services.inventory();
        let ctx = SessionContext::new("admin");

        let item = inventory.create_item(&ring(10)).await.unwrap();

        inventory
            .correct_stock(&ctx, &item.id, &Location::Warehouse, 7)
            .await
            .unwrap();
        assert_eq!(
            inventory.quantity_at(&item.id, &Location::Warehouse).await.unwrap(),
            7
        );

        assert!(inventory
            .correct_stock(&ctx, &item.id, &Location::Warehouse, -1)
            .await
            .is_err());
        assert!(inventory
            .correct_stock(&ctx, "no-such-item", &Location::Warehouse, 1)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn search_falls_back_to_listing_on_empty_query() {
        let services = test_services().await;
        let inventory = services.inventory();

        inventory.create_item(&ring(0)).await.unwrap();

        let hits = inventory.search_items("  ", 10).await.unwrap();
        assert_eq!(hits.len(), 1);

        let hits = inventory.search_items("gold", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
    }
}
