//! # karat-core: Pure Business Logic for Karat
//!
//! This crate is the heart of the Karat jewelry retail system. It contains
//! the domain types and business rules as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  GUI screens (excluded from this workspace)                │
//! └──────────────────────────┬─────────────────────────────────┘
//!                            │
//! ┌──────────────────────────▼─────────────────────────────────┐
//! │  karat-services: inventory, transfers, sales, backup       │
//! │  (owns every transaction boundary)                         │
//! └──────────────────────────┬─────────────────────────────────┘
//!                            │
//! ┌──────────────────────────▼─────────────────────────────────┐
//! │  ★ karat-core (THIS CRATE) ★                               │
//! │  types • money • validation • barcode payloads • errors    │
//! │  NO I/O • NO DATABASE • PURE FUNCTIONS                     │
//! └──────────────────────────┬─────────────────────────────────┘
//!                            │
//! ┌──────────────────────────▼─────────────────────────────────┐
//! │  karat-db: SQLite pool, migrations, repositories           │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: deterministic, no side effects
//! 2. **Integer money**: every monetary value is cents (i64), never floats
//! 3. **Explicit errors**: typed errors via `thiserror`, never strings or panics
//! 4. **Dual-key identity**: UUID primary keys plus business keys (SKU)

// =============================================================================
// Module Declarations
// =============================================================================

pub mod barcode;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity accepted for a single transfer or sale.
///
/// Jewelry moves in small counts; anything beyond this is almost certainly a
/// scanning or typing mistake (e.g. 1000 instead of 10).
pub const MAX_MOVEMENT_QUANTITY: i64 = 9_999;

/// Location key for the warehouse, the default stock-holding location.
pub const WAREHOUSE_KEY: &str = "warehouse";

/// Prefix for shop location keys: `shop:<shop uuid>`.
pub const SHOP_KEY_PREFIX: &str = "shop:";
