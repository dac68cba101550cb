//! Storage Layer
//!
//! SQLite persistence for the host registry and the probe history:
//!
//! - [`HostStore`]: CRUD for the monitored host set
//! - [`ResultStore`]: Append-only probe history and the windowed query
//! - [`SqlitePool`]: Shared connection pool (WAL mode)
//!
//! The scheduler appends concurrently with API reads; SQLite serializes the
//! writers and each row insert is atomic. The only multi-statement unit is
//! the host-deletion cascade, which runs in its own transaction.

mod db;
mod error;
mod host_store;
mod result_store;
pub mod schema;
mod types;

pub use db::SqlitePool;
pub use error::StorageError;
pub use host_store::HostStore;
pub use result_store::{HistoryPage, RESULT_PAGE_LIMIT, ResultStore};
pub use schema::init_schema;
pub use types::{Host, ProbeRecord, Sample, Window};
