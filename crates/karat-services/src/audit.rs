//! # Audit Service
//!
//! Stock-take reconciliation: compare what a shop actually holds (scanned
//! barcodes) against what the system expects, and persist the discrepancies.
//!
//! ## Reconciliation
//! ```text
//! expected = stock_levels at the shop
//! scanned  = SKU → count tallied from the scanner
//!
//! per SKU:
//!   scanned == expected   → Found
//!   scanned <  expected   → Missing (includes not scanned at all)
//!   scanned >  expected   → Extra   (includes unknown SKUs)
//! ```
//! The audit only reports; it never mutates stock. Corrections go through
//! `InventoryService::correct_stock` once someone has decided what the
//! discrepancy means.

use std::collections::HashMap;

use chrono::Utc;
use karat_core::{AuditResult, AuditSession, AuditStatus};
use karat_db::repository::audit::AuditRepository;
use karat_db::{Database, DbError};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::context::SessionContext;
use crate::error::{self, ServiceResult};

/// One scanned SKU with its tallied count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannedLine {
    pub sku: String,
    pub count: i64,
}

/// Service for running and reading stock-takes.
#[derive(Debug, Clone)]
pub struct AuditService {
    db: Database,
}

impl AuditService {
    pub(crate) fn new(db: Database) -> Self {
        AuditService { db }
    }

    /// Runs a stock-take for one shop and persists the session.
    ///
    /// Duplicate SKUs in `scanned` are summed, so the scanner can emit one
    /// line per beep.
    #[instrument(skip(self, ctx, scanned), fields(operator = %ctx.operator()))]
    pub async fn run_stock_take(
        &self,
        ctx: &SessionContext,
        shop_id: &str,
        scanned: &[ScannedLine],
    ) -> ServiceResult<AuditSession> {
        let shop = self
            .db
            .shops()
            .get_by_id(shop_id)
            .await
            .map_err(|e| error::shop_lookup_error(e, shop_id))?;

        // Tally scans per SKU.
        let mut scanned_by_sku: HashMap<String, i64> = HashMap::new();
        for line in scanned {
            *scanned_by_sku.entry(line.sku.clone()).or_default() += line.count;
        }

        // Expected stock at the shop, joined to item details.
        let expected_levels = self.db.stock().levels_at_location(&shop.location()).await?;

        let session_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let mut results: Vec<AuditResult> = Vec::new();

        for level in &expected_levels {
            let item = self.db.items().get_by_id(&level.item_id).await?;
            let scanned_count = scanned_by_sku.remove(&item.sku).unwrap_or(0);

            let status = match scanned_count.cmp(&level.quantity) {
                std::cmp::Ordering::Equal => AuditStatus::Found,
                std::cmp::Ordering::Less => AuditStatus::Missing,
                std::cmp::Ordering::Greater => AuditStatus::Extra,
            };

            results.push(AuditResult {
                id: Uuid::new_v4().to_string(),
                session_id: session_id.clone(),
                item_id: Some(item.id),
                sku: item.sku,
                item_name: Some(item.name),
                expected: level.quantity,
                scanned: scanned_count,
                status,
                created_at: now,
            });
        }

        // Whatever remains was scanned but not expected here. Known SKUs get
        // their item details attached; unknown payloads are kept verbatim.
        let mut leftovers: Vec<_> = scanned_by_sku.into_iter().collect();
        leftovers.sort();
        for (sku, count) in leftovers {
            if count <= 0 {
                continue;
            }
            let item = self.db.items().get_by_sku(&sku).await.ok();
            results.push(AuditResult {
                id: Uuid::new_v4().to_string(),
                session_id: session_id.clone(),
                item_id: item.as_ref().map(|i| i.id.clone()),
                sku,
                item_name: item.map(|i| i.name),
                expected: 0,
                scanned: count,
                status: AuditStatus::Extra,
                created_at: now,
            });
        }

        let session = AuditSession {
            id: session_id,
            shop_id: shop.id.clone(),
            shop_name: shop.name.clone(),
            total_expected: results.iter().map(|r| r.expected).sum(),
            total_scanned: results.iter().map(|r| r.scanned).sum(),
            total_missing: results
                .iter()
                .filter(|r| r.status == AuditStatus::Missing)
                .map(|r| r.expected - r.scanned)
                .sum(),
            total_extra: results
                .iter()
                .filter(|r| r.status == AuditStatus::Extra)
                .map(|r| r.scanned - r.expected)
                .sum(),
            recorded_by: ctx.operator().to_string(),
            created_at: now,
        };

        // Session header and all results land together.
        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;
        AuditRepository::insert_session_in(&mut *tx, &session).await?;
        for result in &results {
            AuditRepository::insert_result_in(&mut *tx, result).await?;
        }
        tx.commit().await.map_err(DbError::from)?;

        info!(
            shop = %session.shop_name,
            missing = session.total_missing,
            extra = session.total_extra,
            "Stock-take recorded"
        );
        Ok(session)
    }

    /// Past sessions, newest first.
    pub async fn sessions(&self, limit: i64) -> ServiceResult<Vec<AuditSession>> {
        Ok(self.db.audits().list_sessions(limit).await?)
    }

    /// Per-item results of one session, discrepancies first.
    pub async fn results(&self, session_id: &str) -> ServiceResult<Vec<AuditResult>> {
        Ok(self.db.audits().results_for_session(session_id).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
