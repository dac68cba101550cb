//! Hostwatch - Network Host Reachability Monitor
//!
//! This crate provides the core functionality for the hostwatch monitoring
//! system. It can be used as a library by other Rust projects, or run as a
//! standalone binary with the `hostwatch` executable.
//!
//! # Architecture
//!
//! - **Prober**: Single-attempt ICMP reachability probe behind a trait
//! - **Collector**: Fixed-size probe batches condensed to one median sample
//! - **Scheduler**: Background cycle driver over the registered host set
//! - **Storage**: SQLite persistence for hosts and probe history
//! - **Server**: HTTP API for host management and windowed statistics

pub mod collector;
pub mod config;
pub mod prober;
pub mod scheduler;
pub mod server;
pub mod storage;

pub use collector::{SampleCollector, SamplePolicy};
pub use config::{AppConfig, ConfigError};
pub use prober::{IcmpProber, ProbeOutcome, Prober};
pub use scheduler::{Scheduler, SchedulerHandle};
pub use storage::{
    HistoryPage, Host, HostStore, ProbeRecord, ResultStore, Sample, SqlitePool, StorageError,
    Window, init_schema,
};
