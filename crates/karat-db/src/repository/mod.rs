//! # Repository Modules
//!
//! One repository per aggregate. Each repository owns a pool clone; methods
//! that must participate in a service-layer transaction are associated
//! functions over a generic [`sqlx::Executor`] instead.

use karat_core::Location;

use crate::error::{DbError, DbResult};

pub mod audit;
pub mod item;
pub mod lookup;
pub mod operator;
pub mod report;
pub mod sale;
pub mod shop;
pub mod stock;
pub mod transfer;

/// Parses a persisted location key, mapping corruption to an internal error.
///
/// Location keys are written exclusively through [`Location::as_key`], so a
/// parse failure here means the database was edited by hand.
pub(crate) fn parse_location(key: &str) -> DbResult<Location> {
    Location::from_key(key)
        .map_err(|e| DbError::Internal(format!("corrupt location key in database: {e}")))
}
