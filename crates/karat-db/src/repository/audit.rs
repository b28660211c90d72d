//! # Audit Repository
//!
//! Persistence for stock-take sessions. A session and its per-item results
//! are written together in one transaction by the audit service; this module
//! only stores and reads them back.

use karat_core::{AuditResult, AuditSession};
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};

/// Repository for stock-audit sessions and results.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    /// Inserts an audit session header inside the audit transaction.
    pub async fn insert_session_in<'e, E>(executor: E, session: &AuditSession) -> DbResult<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query(
            "INSERT INTO audit_sessions (id, shop_id, shop_name, total_expected,
                                         total_scanned, total_missing, total_extra,
                                         recorded_by, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&session.id)
        .bind(&session.shop_id)
        .bind(&session.shop_name)
        .bind(session.total_expected)
        .bind(session.total_scanned)
        .bind(session.total_missing)
        .bind(session.total_extra)
        .bind(&session.recorded_by)
        .bind(session.created_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Inserts one per-item result inside the audit transaction.
    pub async fn insert_result_in<'e, E>(executor: E, result: &AuditResult) -> DbResult<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query(
            "INSERT INTO audit_results (id, session_id, item_id, sku, item_name,
                                        expected, scanned, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&result.id)
        .bind(&result.session_id)
        .bind(&result.item_id)
        .bind(&result.sku)
        .bind(&result.item_name)
        .bind(result.expected)
        .bind(result.scanned)
        .bind(result.status)
        .bind(result.created_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Gets a session header by id.
    pub async fn get_session(&self, id: &str) -> DbResult<AuditSession> {
        sqlx::query_as::<_, AuditSession>(
            "SELECT id, shop_id, shop_name, total_expected, total_scanned,
                    total_missing, total_extra, recorded_by, created_at
             FROM audit_sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Audit session", id))
    }

    /// Lists sessions, newest first.
    pub async fn list_sessions(&self, limit: i64) -> DbResult<Vec<AuditSession>> {
        let sessions = sqlx::query_as::<_, AuditSession>(
            "SELECT id, shop_id, shop_name, total_expected, total_scanned,
                    total_missing, total_extra, recorded_by, created_at
             FROM audit_sessions
             ORDER BY created_at DESC, id DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    /// All per-item results for one session, discrepancies first.
    pub async fn results_for_session(&self, session_id: &str) -> DbResult<Vec<AuditResult>> {
        let results = sqlx::query_as::<_, AuditResult>(
            "SELECT id, session_id, item_id, sku, item_name, expected, scanned,
                    status, created_at
             FROM audit_results
             WHERE session_id = ?
             ORDER BY (status = 'found'), sku",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(results)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
