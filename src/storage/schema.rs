//! Database schema definitions.

use crate::storage::{SqlitePool, StorageError};

/// SQL statement for creating the hosts table.
///
/// `address` is unique so that registering the same host twice is a no-op.
pub const HOSTS_TABLE_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS hosts (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    address TEXT NOT NULL UNIQUE
)
"#;

/// SQL statement for creating the results table.
///
/// Append-only probe history. `latency` is NULL exactly when `success` is
/// false. `ts` is UTC microseconds since the epoch.
pub const RESULTS_TABLE_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS results (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    host_id INTEGER NOT NULL REFERENCES hosts(id),
    ts      BIGINT NOT NULL,
    latency DOUBLE,
    success BOOLEAN NOT NULL
)
"#;

/// Index backing the per-host, newest-first history query.
pub const RESULTS_HOST_TS_INDEX_DDL: &str =
    "CREATE INDEX IF NOT EXISTS idx_results_host_ts ON results (host_id, ts DESC)";

/// Initialize the database schema.
///
/// Creates all necessary tables and indexes if they don't exist.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::query(HOSTS_TABLE_DDL).execute(pool.inner()).await?;
    sqlx::query(RESULTS_TABLE_DDL).execute(pool.inner()).await?;
    sqlx::query(RESULTS_HOST_TS_INDEX_DDL)
        .execute(pool.inner())
        .await?;

    tracing::info!("Database schema initialized");
    Ok(())
}
