//! Probe result storage and the windowed history query.
//!
//! The scheduler appends one record per live host per cycle; the HTTP API
//! reads pages of history with summary statistics. Statistics are computed
//! over exactly the returned page (filtered, ordered, capped), never over
//! the unbounded history.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::storage::{ProbeRecord, Sample, SqlitePool, StorageError, Window};

/// Maximum records returned by a single history query.
pub const RESULT_PAGE_LIMIT: i64 = 1000;

/// One page of probe history with its summary statistics.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryPage {
    /// Matching records, newest first, capped at [`RESULT_PAGE_LIMIT`].
    pub results: Vec<ProbeRecord>,
    /// Mean of the non-null latencies on this page; `None` if there are none.
    pub avg_latency: Option<f64>,
    /// Fraction of records on this page with `success = true`; `None` if
    /// the page is empty.
    pub success_rate: Option<f64>,
}

impl HistoryPage {
    /// Build a page from its records, computing the summary statistics.
    pub fn summarize(records: Vec<ProbeRecord>) -> Self {
        let latencies: Vec<f64> = records.iter().filter_map(|r| r.latency_ms).collect();
        let avg_latency = (!latencies.is_empty())
            .then(|| latencies.iter().sum::<f64>() / latencies.len() as f64);
        let success_rate = (!records.is_empty())
            .then(|| records.iter().filter(|r| r.success).count() as f64 / records.len() as f64);

        Self {
            results: records,
            avg_latency,
            success_rate,
        }
    }
}

/// Result store facade over the shared pool.
#[derive(Debug, Clone)]
pub struct ResultStore {
    pool: SqlitePool,
}

impl ResultStore {
    /// Create a new result store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a sample for a host, stamped with the current time.
    pub async fn append(&self, host_id: i64, sample: &Sample) -> Result<(), StorageError> {
        self.append_at(host_id, Utc::now(), sample).await
    }

    /// Append a sample with an explicit timestamp (backfill, test seeding).
    pub async fn append_at(
        &self,
        host_id: i64,
        ts: DateTime<Utc>,
        sample: &Sample,
    ) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO results (host_id, ts, latency, success) VALUES (?, ?, ?, ?)")
            .bind(host_id)
            .bind(ts.timestamp_micros())
            .bind(sample.latency_ms)
            .bind(sample.success)
            .execute(self.pool.inner())
            .await?;
        Ok(())
    }

    /// Query a host's history within a window.
    ///
    /// Records with `ts >= now - window` (all records for [`Window::All`]),
    /// newest first, capped at the most recent [`RESULT_PAGE_LIMIT`] rows.
    pub async fn query(&self, host_id: i64, window: Window) -> Result<HistoryPage, StorageError> {
        let cutoff = window.cutoff(Utc::now());

        let mut sql =
            String::from("SELECT id, host_id, ts, latency, success FROM results WHERE host_id = ?");
        if cutoff.is_some() {
            sql.push_str(" AND ts >= ?");
        }
        sql.push_str(" ORDER BY ts DESC LIMIT ?");

        let mut query = sqlx::query(&sql).bind(host_id);
        if let Some(cutoff) = cutoff {
            query = query.bind(cutoff.timestamp_micros());
        }
        let rows = query
            .bind(RESULT_PAGE_LIMIT)
            .fetch_all(self.pool.inner())
            .await?;

        let records = rows
            .iter()
            .map(row_to_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(HistoryPage::summarize(records))
    }
}

fn row_to_record(row: &SqliteRow) -> Result<ProbeRecord, StorageError> {
    let micros: i64 = row.get(2);
    let ts = DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| StorageError::InvalidData(format!("timestamp out of range: {micros}")))?;

    Ok(ProbeRecord {
        id: row.get(0),
        host_id: row.get(1),
        ts,
        latency_ms: row.get(3),
        success: row.get(4),
    })
}
