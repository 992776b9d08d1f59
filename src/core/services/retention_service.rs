use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::json;

use crate::core::errors::Result;
use crate::core::models::log_entry::NewLogEntry;
use crate::core::traits::clock::{Clock, SystemClock};
use crate::core::traits::log_store::LogStore;

/// Days an entry is kept when nothing else is configured.
pub const DEFAULT_RETENTION_DAYS: u32 = 90;

/// Longest retention window accepted from configuration or the command
/// line (about a century).
pub const MAX_RETENTION_DAYS: u32 = 36_500;

/// Action recorded after a sweep that removed something.
pub const CLEANUP_ACTION: &str = "logs_cleaned_up";

/// Outcome of one retention sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepReport {
    pub deleted: u64,
    pub older_than_days: u32,
    pub threshold: DateTime<Utc>,
    /// Id of the `logs_cleaned_up` entry, when one was written.
    pub recorded_entry: Option<u64>,
}

/// Deletes entries older than the retention window.
///
/// The sweeper is the unit of work only; whatever runs it on a schedule
/// owns the cadence and any retries.
pub struct RetentionSweeper<'a> {
    store: &'a dyn LogStore,
    retention_days: u32,
    clock: Arc<dyn Clock>,
}

impl<'a> RetentionSweeper<'a> {
    pub fn new(store: &'a dyn LogStore) -> Self {
        Self {
            store,
            retention_days: DEFAULT_RETENTION_DAYS,
            clock: Arc::new(SystemClock),
        }
    }

    /// Time source for [`RetentionSweeper::sweep`]. Pass the store's clock
    /// so the threshold and the recorded entry agree.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Sweep relative to the clock's current time.
    pub fn sweep(&self) -> Result<SweepReport> {
        self.sweep_at(self.clock.now())
    }

    /// Sweep relative to `now`.
    ///
    /// A storage failure on the delete is returned and nothing is recorded.
    /// When rows were removed, a `logs_cleaned_up` entry is written; failing
    /// to write it only produces a warning.
    pub fn sweep_at(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let threshold = threshold(now, self.retention_days);
        let deleted = self.store.delete_older_than(threshold)?;

        let recorded_entry = if deleted > 0 {
            let entry = NewLogEntry::new(CLEANUP_ACTION).metadata(json!({
                "deleted_count": deleted,
                "older_than_days": self.retention_days,
            }));
            match self.store.insert(&entry) {
                Ok(id) => Some(id),
                Err(e) => {
                    tracing::warn!(error = %e, "could not record retention sweep");
                    None
                }
            }
        } else {
            None
        };

        tracing::info!(
            deleted,
            older_than_days = self.retention_days,
            "retention sweep finished"
        );

        Ok(SweepReport {
            deleted,
            older_than_days: self.retention_days,
            threshold,
            recorded_entry,
        })
    }
}

/// `now` minus `days`, clamped to the earliest representable instant when
/// the window reaches past it. Nothing is older than the clamp.
fn threshold(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    Duration::try_days(i64::from(days))
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
