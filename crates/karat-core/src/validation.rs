//! # Validation Module
//!
//! Input validation for Karat.
//!
//! ## Validation Strategy
//! ```text
//! Layer 1: GUI form checks (excluded from this workspace)
//!          │
//!          ▼
//! Layer 2: THIS MODULE - business rule validation in the service layer
//!          │
//!          ▼
//! Layer 3: SQLite constraints - NOT NULL, UNIQUE, CHECK (quantity >= 0)
//! ```
//! Defense in depth: the constraints catch what slips past the code, the code
//! produces friendlier errors than the constraints.

use crate::error::ValidationError;
use crate::MAX_MOVEMENT_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU / barcode payload.
///
/// ## Rules
/// - Must not be empty
/// - At most 48 characters (Code 128 labels get unwieldy past that)
/// - Alphanumeric plus hyphens only, so it stays scannable
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 48 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 48,
        });
    }

    if !sku.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, and hyphens".to_string(),
        });
    }

    Ok(())
}

/// Validates an item name.
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a shop name.
pub fn validate_shop_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "shop name".to_string(),
        });
    }

    if name.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "shop name".to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates a search query. Empty is allowed (returns default results).
///
/// Returns the trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a transfer or sale quantity.
///
/// ## Rules
/// - Must be positive (> 0); zero-unit movements are meaningless
/// - Must not exceed [`MAX_MOVEMENT_QUANTITY`]
pub fn validate_movement_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_MOVEMENT_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_MOVEMENT_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an absolute stock count (initial quantity, manual correction).
///
/// Zero is legal here: a location may genuinely hold nothing.
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a price or cost in cents. Zero is allowed (giveaway items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates an item weight in grams.
pub fn validate_weight_grams(weight: f64) -> ValidationResult<()> {
    if weight < 0.0 || !weight.is_finite() {
        return Err(ValidationError::MustNotBeNegative {
            field: "weight".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sku_rules() {
        assert!(validate_sku("1000042").is_ok());
        assert!(validate_sku("RING-585-001").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"9".repeat(60)).is_err());
    }

    #[test]
    fn item_name_rules() {
        assert!(validate_item_name("Gold ring 585, 2.1g").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn movement_quantity_rules() {
        assert!(validate_movement_quantity(1).is_ok());
        assert!(validate_movement_quantity(MAX_MOVEMENT_QUANTITY).is_ok());

        assert!(validate_movement_quantity(0).is_err());
        assert!(validate_movement_quantity(-1).is_err());
        assert!(validate_movement_quantity(MAX_MOVEMENT_QUANTITY + 1).is_err());
    }

    #[test]
    fn stock_quantity_allows_zero() {
        assert!(validate_stock_quantity(0).is_ok());
        assert!(validate_stock_quantity(10).is_ok());
        assert!(validate_stock_quantity(-1).is_err());
    }

    #[test]
    fn price_rules() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(129_900).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn weight_rules() {
        assert!(validate_weight_grams(2.15).is_ok());
        assert!(validate_weight_grams(0.0).is_ok());
        assert!(validate_weight_grams(-0.5).is_err());
        assert!(validate_weight_grams(f64::NAN).is_err());
    }

    #[test]
    fn uuid_rules() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
