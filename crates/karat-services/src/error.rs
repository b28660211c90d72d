//! # Service Error Types
//!
//! The single error surface the presentation layer sees.
//!
//! ## Error Flow
//! ```text
//! CoreError (business rules)  ─┐
//!                              ├──► ServiceError ──► GUI / CLI
//! DbError (persistence)       ─┘
//! ```
//! Classification helpers (`is_insufficient_stock`, `is_not_found`,
//! `is_integrity_violation`) let callers branch on the failure family without
//! unpacking the wrapped error.

use karat_core::{CoreError, ValidationError};
use karat_db::DbError;
use thiserror::Error;

/// Errors surfaced by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Business rule violation (insufficient stock, unknown item, ...).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Persistence failure, including constraint violations.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Core(CoreError::Validation(err))
    }
}

impl ServiceError {
    /// True when the operation failed because a location held too little
    /// stock. The rejected operation changed nothing.
    pub fn is_insufficient_stock(&self) -> bool {
        matches!(self, ServiceError::Core(CoreError::InsufficientStock { .. }))
    }

    /// True when a referenced item or shop does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::Core(CoreError::ItemNotFound(_))
                | ServiceError::Core(CoreError::ShopNotFound(_))
                | ServiceError::Db(DbError::NotFound { .. })
        )
    }

    /// True when a uniqueness or referential rule was violated (duplicate
    /// SKU, duplicate shop name, dangling reference).
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, ServiceError::Db(e) if e.is_integrity_violation())
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Maps a failed shop lookup to [`CoreError::ShopNotFound`], passing other
/// database errors through. Services use this so an unknown shop id surfaces
/// as the business error, not a bare row-not-found.
pub(crate) fn shop_lookup_error(err: DbError, key: &str) -> ServiceError {
    match err {
        DbError::NotFound { .. } => CoreError::ShopNotFound(key.to_string()).into(),
        other => other.into(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use karat_core::Location;

    #[test]
    fn classification_helpers() {
        let err: ServiceError = CoreError::InsufficientStock {
            sku: "1000042".to_string(),
            location: Location::Warehouse,
            available: 6,
            requested: 10,
        }
        .into();
        assert!(err.is_insufficient_stock());
        assert!(!err.is_not_found());

        let err: ServiceError = CoreError::ItemNotFound("1000099".to_string()).into();
        assert!(err.is_not_found());

        let err: ServiceError = DbError::duplicate("items.sku", "1000042").into();
        assert!(err.is_integrity_violation());
    }

    #[test]
    fn shop_lookup_mapping() {
        let err = shop_lookup_error(DbError::not_found("Shop", "s1"), "s1");
        assert!(matches!(err, ServiceError::Core(CoreError::ShopNotFound(_))));

        // Non-lookup failures pass through untouched.
        let err = shop_lookup_error(DbError::PoolExhausted, "s1");
        assert!(matches!(err, ServiceError::Db(DbError::PoolExhausted)));
    }

    #[test]
    fn validation_wraps_into_core() {
        let err: ServiceError = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into();
        assert!(matches!(err, ServiceError::Core(CoreError::Validation(_))));
    }
}
