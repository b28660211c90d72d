//! # Sales Processor
//!
//! Records sales: stock check, atomic decrement, and profit calculation in
//! one transaction.
//!
//! ## Profit
//! ```text
//! profit = (unit sale price - recorded cost) × quantity
//! ```
//! The item's cost is snapshotted into the sale row, so repricing an item
//! later never rewrites historical profit. Selling below cost produces a
//! negative profit and is recorded as such.

use std::sync::Arc;

use karat_core::{validation, CoreError, Location, Money, Sale};
use karat_db::repository::item::ItemRepository;
use karat_db::repository::sale::SaleRepository;
use karat_db::repository::stock::StockRepository;
use karat_db::{Database, DbError};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::context::SessionContext;
use crate::error::ServiceResult;

/// Service for recording sales.
#[derive(Debug, Clone)]
pub struct SalesProcessor {
    db: Database,
    stock_lock: Arc<Mutex<()>>,
}

impl SalesProcessor {
    pub(crate) fn new(db: Database, stock_lock: Arc<Mutex<()>>) -> Self {
        SalesProcessor { db, stock_lock }
    }

    /// Records a sale of `quantity` units at `location`.
    ///
    /// `price_override_cents` replaces the item's listed price for this sale
    /// (negotiated discounts are routine in jewelry retail); `None` sells at
    /// the listed price.
    ///
    /// ## Errors
    /// * [`CoreError::ItemNotFound`] - SKU matches no active item
    /// * [`CoreError::InsufficientStock`] - location holds fewer than
    ///   `quantity` units; nothing changes
    #[instrument(skip(self, ctx), fields(operator = %ctx.operator()))]
    pub async fn record_sale(
        &self,
        ctx: &SessionContext,
        sku: &str,
        location: &Location,
        quantity: i64,
        price_override_cents: Option<i64>,
    ) -> ServiceResult<Sale> {
        validation::validate_movement_quantity(quantity)?;
        if let Some(price) = price_override_cents {
            validation::validate_price_cents(price)?;
        }

        let _guard = self.stock_lock.lock().await;

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        let item = ItemRepository::fetch_by_sku(&mut *tx, sku)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(sku.to_string()))?;

        let available = StockRepository::quantity(&mut *tx, &item.id, location).await?;
        if available < quantity {
            warn!(
                sku,
                %location,
                available,
                requested = quantity,
                "Sale rejected: insufficient stock"
            );
            return Err(CoreError::InsufficientStock {
                sku: item.sku,
                location: location.clone(),
                available,
                requested: quantity,
            }
            .into());
        }

        let decremented =
            StockRepository::try_decrement(&mut *tx, &item.id, location, quantity).await?;
        if !decremented {
            return Err(CoreError::InsufficientStock {
                sku: item.sku,
                location: location.clone(),
                available,
                requested: quantity,
            }
            .into());
        }

        let unit_price = Money::from_cents(price_override_cents.unwrap_or(item.price_cents));
        let profit = (unit_price - item.cost()).multiply_quantity(quantity);

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            item_id: item.id.clone(),
            location: location.clone(),
            quantity,
            unit_price_cents: unit_price.cents(),
            cost_snapshot_cents: item.cost_cents,
            profit_cents: profit.cents(),
            recorded_by: ctx.operator().to_string(),
            created_at: chrono::Utc::now(),
        };
        SaleRepository::insert_in(&mut *tx, &sale).await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            item_id = %sale.item_id,
            %location,
            quantity,
            profit = %sale.profit(),
            "Sale recorded"
        );
        Ok(sale)
    }

    /// Recent sales, newest first.
    pub async fn history(&self, limit: i64) -> ServiceResult<Vec<Sale>> {
        Ok(self.db.sales().list_recent(limit).await?)
    }

    /// Sale history for one item.
    pub async fn history_for_item(&self, item_id: &str, limit: i64) -> ServiceResult<Vec<Sale>> {
        Ok(self.db.sales().list_for_item(item_id, limit).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
