//! # Domain Types
//!
//! Core domain types used throughout Karat.
//!
//! ## Type Overview
//! ```text
//! ┌───────────────┐  ┌────────────────┐  ┌───────────────┐
//! │     Item      │  │   StockLevel   │  │     Shop      │
//! │  ───────────  │  │  ────────────  │  │  ───────────  │
//! │  id (UUID)    │  │  item_id       │  │  id (UUID)    │
//! │  sku (biz)    │  │  location      │  │  name (biz)   │
//! │  price_cents  │  │  quantity ≥ 0  │  └───────────────┘
//! └───────────────┘  └────────────────┘
//!
//! ┌───────────────┐  ┌────────────────┐
//! │   Transfer    │  │      Sale      │   append-only, immutable
//! │  src → dest   │  │  loc, profit   │   once created
//! └───────────────┘  └────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business key (SKU, shop name) - human-readable, potentially mutable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::money::Money;
use crate::{SHOP_KEY_PREFIX, WAREHOUSE_KEY};

// =============================================================================
// Location
// =============================================================================

/// A stock-holding location: the warehouse or a specific shop.
///
/// Persisted as a single TEXT key (`warehouse` or `shop:<uuid>`) so that
/// `stock_levels` stays one table with one uniqueness rule per (item,
/// location) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Location {
    /// Default stock-holding location, distinct from all shops.
    Warehouse,
    /// A shop, referenced by its UUID.
    Shop(String),
}

/// A location key that is neither `warehouse` nor `shop:<id>`.
#[derive(Debug, Error)]
#[error("invalid location key: {0}")]
pub struct ParseLocationError(pub String);

impl Location {
    /// Creates a shop location from a shop id.
    pub fn shop(shop_id: impl Into<String>) -> Self {
        Location::Shop(shop_id.into())
    }

    /// Returns the persistent key for this location.
    pub fn as_key(&self) -> String {
        match self {
            Location::Warehouse => WAREHOUSE_KEY.to_string(),
            Location::Shop(id) => format!("{SHOP_KEY_PREFIX}{id}"),
        }
    }

    /// Parses a persistent location key.
    pub fn from_key(key: &str) -> Result<Self, ParseLocationError> {
        if key == WAREHOUSE_KEY {
            return Ok(Location::Warehouse);
        }
        match key.strip_prefix(SHOP_KEY_PREFIX) {
            Some(id) if !id.is_empty() => Ok(Location::Shop(id.to_string())),
            _ => Err(ParseLocationError(key.to_string())),
        }
    }

    pub const fn is_warehouse(&self) -> bool {
        matches!(self, Location::Warehouse)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key())
    }
}

impl FromStr for Location {
    type Err = ParseLocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Location::from_key(s)
    }
}

impl From<Location> for String {
    fn from(location: Location) -> String {
        location.as_key()
    }
}

impl TryFrom<String> for Location {
    type Error = ParseLocationError;

    fn try_from(key: String) -> Result<Self, Self::Error> {
        Location::from_key(&key)
    }
}

// =============================================================================
// Item
// =============================================================================

/// A jewelry item in the inventory.
///
/// Items are never hard-deleted; `is_active` is flipped off instead so that
/// sales and transfers keep their history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Item {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// SKU, also the barcode payload printed on the label.
    pub sku: String,

    /// Display name.
    pub name: String,

    pub description: Option<String>,

    /// Category (ring, necklace, ...) from the lookup master data.
    pub category: String,

    pub metal: Option<String>,

    pub stone: Option<String>,

    /// Weight in grams.
    pub weight_grams: Option<f64>,

    /// Selling price in cents.
    pub price_cents: i64,

    /// Acquisition cost in cents (for profit calculations).
    pub cost_cents: i64,

    /// Soft-delete flag.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Returns the selling price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the acquisition cost as a Money type.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }
}

/// Input for creating a new item.
///
/// `sku: None` asks the service to allocate the next SKU from the sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub sku: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub metal: Option<String>,
    pub stone: Option<String>,
    pub weight_grams: Option<f64>,
    pub price_cents: i64,
    pub cost_cents: i64,
    /// Initial on-hand quantity placed at the warehouse.
    pub initial_quantity: i64,
}

// =============================================================================
// Shop
// =============================================================================

/// A retail shop holding transferred stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Shop {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Shop {
    /// Returns this shop's stock location.
    pub fn location(&self) -> Location {
        Location::Shop(self.id.clone())
    }
}

// =============================================================================
// Stock Level
// =============================================================================

/// On-hand quantity of one item at one location.
///
/// Invariant: `quantity >= 0` at all times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLevel {
    pub item_id: String,
    pub location: Location,
    pub quantity: i64,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Transfer
// =============================================================================

/// An append-only record of a stock movement between two locations.
///
/// Source decrement and destination increment happen atomically with this
/// record's insertion; a transfer row therefore always describes a movement
/// that fully happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub id: String,
    pub item_id: String,
    pub source: Location,
    pub destination: Location,
    pub quantity: i64,
    /// Operator from the session context.
    pub recorded_by: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// An append-only record of a sale at a location.
///
/// Cost is frozen at sale time (snapshot pattern) so later repricing of the
/// item does not rewrite historical profit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub item_id: String,
    pub location: Location,
    pub quantity: i64,
    /// Unit sale price in cents (may differ from the listed price).
    pub unit_price_cents: i64,
    /// Item cost at time of sale, frozen.
    pub cost_snapshot_cents: i64,
    /// (unit price - cost snapshot) × quantity.
    pub profit_cents: i64,
    pub recorded_by: String,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.profit_cents)
    }

    /// Total charged for this sale.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Lookup Master Data
// =============================================================================

/// Kind of lookup value: item categories, metals, stones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum LookupKind {
    Category,
    Metal,
    Stone,
}

impl LookupKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LookupKind::Category => "category",
            LookupKind::Metal => "metal",
            LookupKind::Stone => "stone",
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A master-data value (e.g. category "Ring", metal "Gold 585").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LookupValue {
    pub id: String,
    pub kind: LookupKind,
    pub value: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Stock Audit
// =============================================================================

/// Outcome for one item in a stock-take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    /// Scanned count matches the expected stock level.
    Found,
    /// Expected at the shop but scanned short (or not at all).
    Missing,
    /// Scanned but not expected, or scanned above the expected count.
    Extra,
}

/// A completed stock-take session for one shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditSession {
    pub id: String,
    pub shop_id: String,
    /// Shop name frozen at audit time.
    pub shop_name: String,
    pub total_expected: i64,
    pub total_scanned: i64,
    pub total_missing: i64,
    pub total_extra: i64,
    pub recorded_by: String,
    pub created_at: DateTime<Utc>,
}

/// Per-item outcome within an audit session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditResult {
    pub id: String,
    pub session_id: String,
    /// None when a scanned SKU matches no known item.
    pub item_id: Option<String>,
    pub sku: String,
    pub item_name: Option<String>,
    pub expected: i64,
    pub scanned: i64,
    pub status: AuditStatus,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Operator
// =============================================================================

/// An operator account. The password hash is argon2; verification lives in
/// the db layer, login flow in the (excluded) GUI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Operator {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_keys_round_trip() {
        assert_eq!(Location::Warehouse.as_key(), "warehouse");
        assert_eq!(Location::shop("abc").as_key(), "shop:abc");

        assert_eq!(Location::from_key("warehouse").unwrap(), Location::Warehouse);
        assert_eq!(
            Location::from_key("shop:abc").unwrap(),
            Location::Shop("abc".to_string())
        );
    }

    #[test]
    fn location_rejects_bad_keys() {
        assert!(Location::from_key("").is_err());
        assert!(Location::from_key("shop:").is_err());
        assert!(Location::from_key("basement").is_err());
    }

    #[test]
    fn location_serde_uses_keys() {
        let json = serde_json::to_string(&Location::shop("abc")).unwrap();
        assert_eq!(json, "\"shop:abc\"");

        let loc: Location = serde_json::from_str("\"warehouse\"").unwrap();
        assert_eq!(loc, Location::Warehouse);
    }

    #[test]
    fn sale_totals() {
        let sale = Sale {
            id: "s1".to_string(),
            item_id: "i1".to_string(),
            location: Location::Warehouse,
            quantity: 3,
            unit_price_cents: 50_000,
            cost_snapshot_cents: 30_000,
            profit_cents: 60_000,
            recorded_by: "admin".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(sale.total().cents(), 150_000);
        assert_eq!(sale.profit().cents(), 60_000);
    }
}
