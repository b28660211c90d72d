//! # karat-db: Database Layer for Karat
//!
//! SQLite persistence for the Karat jewelry retail system, built on sqlx.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (item, stock, shop, ...)
//!
//! ## Repository Calling Conventions
//!
//! Repositories come in two flavors of method:
//!
//! - `&self` methods run against the pool and are self-contained reads or
//!   single-statement writes.
//! - Associated functions taking an [`sqlx::Executor`] are the primitives the
//!   service layer composes inside transactions (guarded stock decrements,
//!   record insertion). They work equally against the pool or `&mut *tx`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use karat_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("data/karat.db")).await?;
//! let item = db.items().get_by_sku("1000042").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::audit::AuditRepository;
pub use repository::item::ItemRepository;
pub use repository::lookup::LookupRepository;
pub use repository::operator::OperatorRepository;
pub use repository::report::ReportRepository;
pub use repository::sale::SaleRepository;
pub use repository::shop::ShopRepository;
pub use repository::stock::StockRepository;
pub use repository::transfer::TransferRepository;
