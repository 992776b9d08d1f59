//! Audit-event logging.
//!
//! Records application events into a SQLite table and reads them back
//! through validated filters compiled into parameter-bound queries.
//! Old entries are expired by a retention sweep the host runs on its own
//! schedule.
//!
//! ```no_run
//! use logify::adapters::store::sqlite_log_store::SqliteLogStore;
//! use logify::core::models::filter::RawFilter;
//! use logify::core::models::log_entry::NewLogEntry;
//! use logify::core::services::log_service::LogService;
//!
//! # fn main() -> logify::core::errors::Result<()> {
//! let store = SqliteLogStore::open("logify.db", "")?;
//! let logs = LogService::new(&store);
//! logs.record(&NewLogEntry::new("user_login").actor(7))?;
//! let recent = logs.find_raw(RawFilter::new().action("user_login").limit(10))?;
//! # let _ = recent;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
