//! # Error Types
//!
//! Domain-specific error types for karat-core.
//!
//! ## Error Hierarchy
//! ```text
//! karat-core errors (this file)
//! ├── CoreError        - Business rule violations (insufficient stock, ...)
//! └── ValidationError  - Input validation failures
//!
//! karat-db errors (separate crate)
//! └── DbError          - Database operation failures
//!
//! karat-services errors
//! └── ServiceError     - Wraps both for the presentation layer
//! ```
//!
//! Every error here is recoverable: the service layer rolls back the
//! surrounding transaction and surfaces the message to the user.

use thiserror::Error;

use crate::types::Location;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Item cannot be found by id or SKU.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Shop cannot be found by id or name.
    #[error("Shop not found: {0}")]
    ShopNotFound(String),

    /// Not enough stock at a location to complete a transfer or sale.
    ///
    /// ## When This Occurs
    /// ```text
    /// Transfer 10 of SKU 1000042 from warehouse
    ///      │
    ///      ▼
    /// Check stock at warehouse: available = 6
    ///      │
    ///      ▼
    /// InsufficientStock { sku: "1000042", location: warehouse,
    ///                     available: 6, requested: 10 }
    /// ```
    /// The surrounding transaction is rolled back; no quantity changes.
    #[error(
        "Insufficient stock for {sku} at {location}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        sku: String,
        location: Location,
        available: i64,
        requested: i64,
    },

    /// Transfer where source and destination are the same location.
    #[error("Source and destination are the same location: {location}")]
    SameLocation { location: Location },

    /// Shop still holds stock and cannot be deleted.
    #[error("Shop '{name}' still holds {units} units of stock")]
    ShopNotEmpty { name: String, units: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements, before any
/// business logic runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g. malformed SKU or UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
