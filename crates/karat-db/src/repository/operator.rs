//! # Operator Repository
//!
//! Operator accounts with argon2 password hashes. Hashing and verification
//! live here so the stored hash never leaves the db layer; the login flow
//! itself belongs to the GUI shell.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use karat_core::Operator;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Username seeded on first run.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Initial PIN for the seeded admin account. Meant to be changed on first
/// login.
pub const DEFAULT_ADMIN_PASSWORD: &str = "0000";

/// Repository for operator accounts.
#[derive(Debug, Clone)]
pub struct OperatorRepository {
    pool: SqlitePool,
}

impl OperatorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OperatorRepository { pool }
    }

    fn hash_password(password: &str) -> DbResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| DbError::Internal(format!("password hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// Creates an operator account with a freshly hashed password.
    pub async fn create(&self, username: &str, password: &str, role: &str) -> DbResult<Operator> {
        let operator = Operator {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: Self::hash_password(password)?,
            role: role.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO operators (id, username, password_hash, role, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&operator.id)
        .bind(&operator.username)
        .bind(&operator.password_hash)
        .bind(&operator.role)
        .bind(operator.created_at)
        .execute(&self.pool)
        .await?;

        Ok(operator)
    }

    /// Verifies a username/password pair.
    ///
    /// Returns the operator on success, `Ok(None)` when the username is
    /// unknown or the password is wrong. The two cases are deliberately
    /// indistinguishable to the caller.
    pub async fn verify(&self, username: &str, password: &str) -> DbResult<Option<Operator>> {
        let operator = sqlx::query_as::<_, Operator>(
            "SELECT id, username, password_hash, role, created_at
             FROM operators WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let Some(operator) = operator else {
            return Ok(None);
        };

        let parsed = PasswordHash::new(&operator.password_hash)
            .map_err(|e| DbError::Internal(format!("corrupt password hash: {e}")))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(Some(operator)),
            Err(_) => Ok(None),
        }
    }

    /// Changes an operator's password.
    pub async fn change_password(&self, username: &str, new_password: &str) -> DbResult<()> {
        let hash = Self::hash_password(new_password)?;

        let result = sqlx::query("UPDATE operators SET password_hash = ? WHERE username = ?")
            .bind(&hash)
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Operator", username));
        }

        Ok(())
    }

    /// Lists operator accounts.
    pub async fn list(&self) -> DbResult<Vec<Operator>> {
        let operators = sqlx::query_as::<_, Operator>(
            "SELECT id, username, password_hash, role, created_at
             FROM operators ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(operators)
    }

    /// Seeds the default admin account if no operators exist.
    pub async fn ensure_default_admin(&self) -> DbResult<()> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM operators")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(());
        }

        info!(username = DEFAULT_ADMIN_USERNAME, "Seeding default admin operator");
        self.create(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD, "admin")
            .await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn default_admin_can_log_in() {
        let db = test_db().await;

        db.operators().ensure_default_admin().await.unwrap();
        // Second call is a no-op.
        db.operators().ensure_default_admin().await.unwrap();
        assert_eq!(db.operators().list().await.unwrap().len(), 1);

        let ok = db
            .operators()
            .verify(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD)
            .await
            .unwrap();
        assert!(ok.is_some());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_alike() {
        let db = test_db().await;
        db.operators().create("clerk", "secret", "staff").await.unwrap();

        assert!(db.operators().verify("clerk", "wrong").await.unwrap().is_none());
        assert!(db.operators().verify("ghost", "secret").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn change_password() {
        let db = test_db().await;
        db.operators().create("clerk", "old", "staff").await.unwrap();

        db.operators().change_password("clerk", "new").await.unwrap();

        assert!(db.operators().verify("clerk", "old").await.unwrap().is_none());
        assert!(db.operators().verify("clerk", "new").await.unwrap().is_some());
    }
}
