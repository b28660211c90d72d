//! # karat-services: Business Operations for Karat
//!
//! The transaction boundaries of the system. karat-core holds the rules,
//! karat-db holds the queries; this crate strings them together so every
//! multi-step mutation is atomic.
//!
//! ## Architecture
//! ```text
//! GUI / CLI
//!     │
//!     ▼
//! ┌──────────────────────────────────────────────────────┐
//! │ Services (this crate)                                │
//! │                                                      │
//! │  InventoryService   item/shop CRUD, stock overview   │
//! │  TransferEngine     warehouse ⇄ shop movements       │
//! │  SalesProcessor     sales + profit recording         │
//! │  AuditService       stock-take reconciliation        │
//! │  BackupManager      snapshot / restore               │
//! │                                                      │
//! │  shared stock lock ── serializes check-then-mutate   │
//! └──────────────────────────────────────────────────────┘
//!     │
//!     ▼
//! karat-db (sqlx / SQLite)
//! ```
//!
//! ## The Stock Lock
//! Transfers, sales and manual corrections all read a quantity, decide, and
//! then write. The [`Services`] facade hands every stock-mutating service a
//! clone of one `Arc<tokio::sync::Mutex<()>>`, so those critical sections
//! never interleave - a transfer cannot race a sale for the same units. The
//! guarded SQL decrement and the `CHECK (quantity >= 0)` constraint stand
//! behind the lock as independent layers.

pub mod audit;
pub mod backup;
pub mod context;
pub mod error;
pub mod inventory;
pub mod sales;
pub mod transfer;

use std::sync::Arc;

use karat_db::Database;
use tokio::sync::Mutex;

pub use audit::{AuditService, ScannedLine};
pub use backup::BackupManager;
pub use context::SessionContext;
pub use error::{ServiceError, ServiceResult};
pub use inventory::InventoryService;
pub use sales::SalesProcessor;
pub use transfer::TransferEngine;

/// Facade wiring all services to one database and one stock lock.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("data/karat.db")).await?;
/// let services = Services::new(db);
///
/// let ctx = SessionContext::new("admin");
/// services.transfers().to_shop(&ctx, "1000042", &shop.id, 4).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Services {
    db: Database,
    stock_lock: Arc<Mutex<()>>,
}

impl Services {
    /// Creates the service facade over an open database.
    pub fn new(db: Database) -> Self {
        Services {
            db,
            stock_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The underlying database handle.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Item, shop and stock management.
    pub fn inventory(&self) -> InventoryService {
        InventoryService::new(self.db.clone(), self.stock_lock.clone())
    }

    /// Stock movements between the warehouse and shops.
    pub fn transfers(&self) -> TransferEngine {
        TransferEngine::new(self.db.clone(), self.stock_lock.clone())
    }

    /// Sale recording with profit calculation.
    pub fn sales(&self) -> SalesProcessor {
        SalesProcessor::new(self.db.clone(), self.stock_lock.clone())
    }

    /// Stock-take reconciliation.
    pub fn audits(&self) -> AuditService {
        AuditService::new(self.db.clone())
    }

    /// Database snapshot and restore.
    pub fn backups(&self) -> BackupManager {
        BackupManager::new(self.db.clone())
    }
}
