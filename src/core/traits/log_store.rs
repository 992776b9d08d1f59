use chrono::{DateTime, Utc};

use crate::core::errors::Result;
use crate::core::models::filter::DistinctField;
use crate::core::models::log_entry::{LogEntry, NewLogEntry};
use crate::core::models::query_plan::QueryPlan;

/// Port for the durable, append-only log table.
///
/// Every call is one atomic statement against the backing store; nothing
/// is cached in process and no call spans a transaction with another.
pub trait LogStore: Send + Sync {
    /// Append an entry and return its id. `created_at` is assigned here.
    fn insert(&self, entry: &NewLogEntry) -> Result<u64>;

    /// Rows matching `plan`, in the plan's order and window.
    fn query(&self, plan: &QueryPlan) -> Result<Vec<LogEntry>>;

    /// Number of rows matching `plan`, ignoring any window.
    fn count(&self, plan: &QueryPlan) -> Result<u64>;

    /// Delete one entry. Returns the number of rows removed (0 or 1);
    /// a missing id is not an error.
    fn delete_by_id(&self, id: u64) -> Result<u64>;

    /// Delete each id in turn. Returns the total number of rows removed.
    fn delete_many(&self, ids: &[u64]) -> Result<u64> {
        let mut removed = 0;
        for id in ids {
            removed += self.delete_by_id(*id)?;
        }
        Ok(removed)
    }

    /// Delete every row with `created_at < threshold`.
    fn delete_older_than(&self, threshold: DateTime<Utc>) -> Result<u64>;

    /// Distinct non-null values of `field`, ascending.
    fn distinct_values(&self, field: DistinctField) -> Result<Vec<String>>;
}
