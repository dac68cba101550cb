//! Host registry storage.
//!
//! CRUD operations for the monitored host set. The scheduler snapshots this
//! set at cycle start; the HTTP API mutates it at any time.

use sqlx::Row;

use crate::storage::{Host, SqlitePool, StorageError};

/// Host registry facade over the shared pool.
#[derive(Debug, Clone)]
pub struct HostStore {
    pool: SqlitePool,
}

impl HostStore {
    /// Create a new host store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all registered hosts, oldest registration first.
    pub async fn list(&self) -> Result<Vec<Host>, StorageError> {
        let rows = sqlx::query("SELECT id, address FROM hosts ORDER BY id")
            .fetch_all(self.pool.inner())
            .await?;

        Ok(rows
            .iter()
            .map(|row| Host {
                id: row.get(0),
                address: row.get(1),
            })
            .collect())
    }

    /// Get a host by id.
    pub async fn get(&self, id: i64) -> Result<Option<Host>, StorageError> {
        let row = sqlx::query("SELECT id, address FROM hosts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool.inner())
            .await?;

        Ok(row.map(|row| Host {
            id: row.get(0),
            address: row.get(1),
        }))
    }

    /// Register a host address.
    ///
    /// Idempotent: adding an address that already exists is a no-op and
    /// returns the existing row. The boolean is true when a new row was
    /// created.
    pub async fn add(&self, address: &str) -> Result<(Host, bool), StorageError> {
        let inserted = sqlx::query("INSERT INTO hosts (address) VALUES (?) ON CONFLICT(address) DO NOTHING")
            .bind(address)
            .execute(self.pool.inner())
            .await?;

        let row = sqlx::query("SELECT id, address FROM hosts WHERE address = ?")
            .bind(address)
            .fetch_one(self.pool.inner())
            .await?;

        let host = Host {
            id: row.get(0),
            address: row.get(1),
        };
        Ok((host, inserted.rows_affected() > 0))
    }

    /// Remove a host and all of its results.
    ///
    /// The host row and its result rows are deleted in one transaction, so a
    /// reader never observes a result referencing a missing host. Returns
    /// false if no host with the given id existed.
    pub async fn remove(&self, id: i64) -> Result<bool, StorageError> {
        let mut tx = self.pool.inner().begin().await?;

        sqlx::query("DELETE FROM results WHERE host_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM hosts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(deleted.rows_affected() > 0)
    }
}
