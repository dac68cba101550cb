//! Core data types for the storage layer.
//!
//! This module defines the data structures shared between the scheduler and
//! the query side:
//!
//! - [`Host`]: A monitored host address with its registry id
//! - [`ProbeRecord`]: One persisted per-cycle probe summary
//! - [`Sample`]: The transient per-cycle summary produced by the collector
//! - [`Window`]: Typed relative time window for history queries

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumString};

/// A monitored host as stored in the `hosts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    /// Registry id, assigned by the database.
    pub id: i64,
    /// Host address (IP or hostname). Unique across all hosts.
    pub address: String,
}

/// One probe summary as stored in the `results` table.
///
/// Records are append-only and immutable once written. `latency_ms` is
/// present exactly when `success` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeRecord {
    /// Auto-generated record identifier.
    pub id: i64,
    /// The host this record belongs to.
    pub host_id: i64,
    /// When the sample was taken (UTC).
    #[serde(rename = "timestamp")]
    pub ts: DateTime<Utc>,
    /// Median round-trip latency of the successful attempts, in milliseconds.
    #[serde(rename = "latency")]
    pub latency_ms: Option<f64>,
    /// Whether at least one probe attempt in the batch succeeded.
    pub success: bool,
}

/// Cycle-level summary emitted by the sample collector.
///
/// Individual probe outcomes are never persisted; only this summary is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Median latency of the successful attempts, `None` if all failed.
    pub latency_ms: Option<f64>,
    /// True if at least one attempt succeeded.
    pub success: bool,
}

/// Relative time window for history queries.
///
/// Parsing is deliberately permissive: an absent or unrecognized token means
/// no time filter at all, matching the external query contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, AsRefStr)]
#[strum(ascii_case_insensitive)]
pub enum Window {
    /// No time filter.
    #[default]
    #[strum(serialize = "all")]
    All,
    /// Records from the last hour.
    #[strum(serialize = "1h")]
    LastHour,
    /// Records from the last 24 hours.
    #[strum(serialize = "24h")]
    LastDay,
    /// Records from the last 7 days.
    #[strum(serialize = "7d")]
    LastWeek,
}

impl Window {
    /// Parse a window token, mapping absent or unknown tokens to [`Window::All`].
    pub fn parse(token: Option<&str>) -> Self {
        token.and_then(|t| t.parse().ok()).unwrap_or_default()
    }

    /// Oldest admissible timestamp for this window, `None` when unfiltered.
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::All => None,
            Self::LastHour => Some(now - Duration::hours(1)),
            Self::LastDay => Some(now - Duration::hours(24)),
            Self::LastWeek => Some(now - Duration::days(7)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_parse_known_tokens() {
        assert_eq!(Window::parse(Some("1h")), Window::LastHour);
        assert_eq!(Window::parse(Some("24h")), Window::LastDay);
        assert_eq!(Window::parse(Some("7d")), Window::LastWeek);
    }

    #[test]
    fn test_window_parse_case_insensitive() {
        assert_eq!(Window::parse(Some("24H")), Window::LastDay);
        assert_eq!(Window::parse(Some("7D")), Window::LastWeek);
    }

    #[test]
    fn test_window_parse_permissive() {
        assert_eq!(Window::parse(None), Window::All);
        assert_eq!(Window::parse(Some("bogus")), Window::All);
        assert_eq!(Window::parse(Some("")), Window::All);
        assert_eq!(Window::parse(Some("30d")), Window::All);
    }

    #[test]
    fn test_window_cutoff() {
        let now = Utc::now();
        assert_eq!(Window::All.cutoff(now), None);
        assert_eq!(Window::LastHour.cutoff(now), Some(now - Duration::hours(1)));
        assert_eq!(Window::LastDay.cutoff(now), Some(now - Duration::hours(24)));
        assert_eq!(Window::LastWeek.cutoff(now), Some(now - Duration::days(7)));
    }
}
