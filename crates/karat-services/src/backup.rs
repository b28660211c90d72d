//! # Backup Manager
//!
//! Database snapshots and restore.
//!
//! ## Snapshot
//! `VACUUM INTO` writes a compacted, transactionally-consistent copy of the
//! live database to a new file, even while WAL mode has uncommitted pages in
//! the log. No downtime, no partial state.
//!
//! ## Restore
//! The reverse is not safe while connections are open: restore closes the
//! pool, removes stale `-wal`/`-shm` sidecars, and copies the snapshot over
//! the database file. The caller reopens the database afterwards.

use std::path::{Path, PathBuf};

use chrono::Utc;
use karat_db::{Database, DbError};
use tracing::{info, instrument};

use crate::error::{ServiceError, ServiceResult};

/// Service for snapshotting and restoring the database file.
#[derive(Debug, Clone)]
pub struct BackupManager {
    db: Database,
}

impl BackupManager {
    pub(crate) fn new(db: Database) -> Self {
        BackupManager { db }
    }

    fn ensure_file_backed(&self) -> ServiceResult<()> {
        if self.db.path() == Path::new(":memory:") {
            return Err(ServiceError::Db(DbError::Internal(
                "cannot back up an in-memory database".to_string(),
            )));
        }
        Ok(())
    }

    /// Writes a timestamped snapshot into `dir` and returns its path.
    ///
    /// The snapshot is a complete standalone SQLite file named
    /// `karat-backup-YYYYMMDD-HHMMSS.db`.
    #[instrument(skip(self))]
    pub async fn snapshot_to(&self, dir: &Path) -> ServiceResult<PathBuf> {
        self.ensure_file_backed()?;

        std::fs::create_dir_all(dir)
            .map_err(|e| ServiceError::Db(DbError::Internal(format!("create backup dir: {e}"))))?;

        let filename = format!("karat-backup-{}.db", Utc::now().format("%Y%m%d-%H%M%S"));
        let target = dir.join(filename);

        // VACUUM INTO refuses to overwrite; a stale file with the same
        // timestamp would make it fail cleanly rather than corrupt anything.
        sqlx::query("VACUUM INTO ?")
            .bind(target.to_string_lossy().into_owned())
            .execute(self.db.pool())
            .await
            .map_err(DbError::from)?;

        info!(path = %target.display(), "Backup snapshot written");
        Ok(target)
    }

    /// Lists snapshots in `dir`, newest first.
    ///
    /// Only files matching the `karat-backup-*.db` naming scheme are
    /// returned; the timestamped names sort chronologically.
    pub fn list_snapshots(&self, dir: &Path) -> ServiceResult<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(dir)
            .map_err(|e| ServiceError::Db(DbError::Internal(format!("read backup dir: {e}"))))?;

        let mut snapshots: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .map(|n| n.starts_with("karat-backup-") && n.ends_with(".db"))
                        .unwrap_or(false)
            })
            .collect();

        snapshots.sort();
        snapshots.reverse();
        Ok(snapshots)
    }

    /// Restores a snapshot over the live database file.
    ///
    /// Closes the pool first; every service handle created from the old
    /// [`Database`] is dead afterwards. Reopen with `Database::new` and
    /// rebuild the services.
    #[instrument(skip(self))]
    pub async fn restore_from(&self, snapshot: &Path) -> ServiceResult<()> {
        self.ensure_file_backed()?;

        if !snapshot.is_file() {
            return Err(ServiceError::Db(DbError::Internal(format!(
                "backup file not found: {}",
                snapshot.display()
            ))));
        }

        let db_path = self.db.path().to_path_buf();
        self.db.close().await;

        // Stale WAL/SHM sidecars would replay old pages over the restored
        // file on next open.
        for suffix in ["-wal", "-shm"] {
            let mut sidecar = db_path.clone().into_os_string();
            sidecar.push(suffix);
            let sidecar = PathBuf::from(sidecar);
            if sidecar.exists() {
                std::fs::remove_file(&sidecar).map_err(|e| {
                    ServiceError::Db(DbError::Internal(format!("remove sidecar: {e}")))
                })?;
            }
        }

        std::fs::copy(snapshot, &db_path)
            .map_err(|e| ServiceError::Db(DbError::Internal(format!("restore copy: {e}"))))?;

        info!(
            snapshot = %snapshot.display(),
            db = %db_path.display(),
            "Database restored from snapshot"
        );
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Services, SessionContext};
    use karat_core::NewItem;
    use karat_db::DbConfig;

    async fn file_services(db_path: &Path) -> Services {
        let db = Database::new(DbConfig::new(db_path)).await.unwrap();
        Services::new(db)
    }

    fn ring(qty: i64) -> NewItem {
        NewItem {
            sku: None,
            name: "Gold ring 585".to_string(),
            description: None,
            category: "Ring".to_string(),
            metal: None,
            stone: None,
            weight_grams: None,
            price_cents: 129_900,
            cost_cents: 80_000,
            initial_quantity: qty,
        }
    }

    #[tokio::test]
    async fn snapshot_and_restore_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("karat.db");
        let backup_dir = dir.path().join("backups");

        // Seed, snapshot, then mutate past the snapshot point.
        let services = file_services(&db_path).await;
        let ctx = SessionContext::new("admin");
        let item = services.inventory().create_item(&ring(10)).await.unwrap();

        let snapshot = services.backups().snapshot_to(&backup_dir).await.unwrap();
        assert!(snapshot.is_file());
        assert_eq!(
            services.backups().list_snapshots(&backup_dir).unwrap(),
            vec![snapshot.clone()]
        );

        services
            .sales()
            .record_sale(&ctx, &item.sku, &karat_core::Location::Warehouse, 4, None)
            .await
            .unwrap();
        assert_eq!(
            services
                .inventory()
                .quantity_at(&item.id, &karat_core::Location::Warehouse)
                .await
                .unwrap(),
            6
        );

        // Restore rolls the world back to the snapshot.
        services.backups().restore_from(&snapshot).await.unwrap();

        let services = file_services(&db_path).await;
        assert_eq!(
            services
                .inventory()
                .quantity_at(&item.id, &karat_core::Location::Warehouse)
                .await
                .unwrap(),
            10
        );
        assert!(services.sales().history(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn restore_rejects_missing_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let services = file_services(&dir.path().join("karat.db")).await;

        let err = services
            .backups()
            .restore_from(&dir.path().join("nope.db"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("backup file not found"));

        // A directory with no snapshots (or none at all) lists as empty.
        assert!(services
            .backups()
            .list_snapshots(&dir.path().join("missing"))
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn in_memory_database_refuses_backup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let services = Services::new(db);

        let dir = tempfile::tempdir().unwrap();
        assert!(services.backups().snapshot_to(dir.path()).await.is_err());
    }
}
