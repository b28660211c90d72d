//! # Session Context
//!
//! Identifies who is operating, and from where. The original design kept the
//! logged-in user and the active shop in global mutable state; here they are
//! an explicit value passed to each mutating operation. Transfers, sales and
//! audits write the operator into their `recorded_by` column.

use serde::{Deserialize, Serialize};

/// The acting operator for a batch of service calls.
///
/// Cheap to clone; the GUI creates one at login and passes it to every
/// mutating service call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    operator: String,
    /// Shop the operator is currently working at, if any. Presentation code
    /// uses it to default transfer destinations and sale locations; the
    /// services themselves always take locations explicitly.
    active_shop: Option<String>,
}

impl SessionContext {
    /// Creates a context for a logged-in operator with no active shop.
    pub fn new(operator: impl Into<String>) -> Self {
        SessionContext {
            operator: operator.into(),
            active_shop: None,
        }
    }

    /// Returns this context with an active shop selected.
    pub fn with_shop(mut self, shop_id: impl Into<String>) -> Self {
        self.active_shop = Some(shop_id.into());
        self
    }

    /// Context for non-interactive work (seeding, scheduled backups).
    pub fn system() -> Self {
        SessionContext {
            operator: "system".to_string(),
            active_shop: None,
        }
    }

    /// The operator's username, as written into `recorded_by`.
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// The shop id the operator is working at, if one is selected.
    pub fn active_shop(&self) -> Option<&str> {
        self.active_shop.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_operator_name() {
        assert_eq!(SessionContext::new("admin").operator(), "admin");
        assert_eq!(SessionContext::system().operator(), "system");
    }

    #[test]
    fn active_shop_is_optional() {
        let ctx = SessionContext::new("admin");
        assert_eq!(ctx.active_shop(), None);

        let ctx = ctx.with_shop("shop-1");
        assert_eq!(ctx.active_shop(), Some("shop-1"));
        assert_eq!(ctx.operator(), "admin");
    }
}
