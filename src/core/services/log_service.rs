use crate::core::errors::Result;
use crate::core::models::filter::{DistinctField, FilterSpec, RawFilter};
use crate::core::models::log_entry::{LogEntry, NewLogEntry};
use crate::core::models::page::{self, LogPage};
use crate::core::services::query_builder::QueryBuilder;
use crate::core::traits::log_store::LogStore;

/// Caller-facing entry point: normalizes filters, compiles them and runs
/// them against a [`LogStore`].
pub struct LogService<'a> {
    store: &'a dyn LogStore,
    builder: QueryBuilder,
    max_limit: Option<u64>,
}

impl<'a> LogService<'a> {
    pub fn new(store: &'a dyn LogStore) -> Self {
        Self {
            store,
            builder: QueryBuilder,
            max_limit: None,
        }
    }

    /// Cap the number of rows any single listing may return.
    pub fn with_max_limit(mut self, max_limit: u64) -> Self {
        self.max_limit = Some(max_limit);
        self
    }

    /// Record an event. Returns the new entry id.
    pub fn record(&self, entry: &NewLogEntry) -> Result<u64> {
        self.store.insert(entry)
    }

    /// Record an event, logging instead of failing when the store refuses.
    /// For non-critical paths that must not be blocked by auditing.
    pub fn record_best_effort(&self, entry: &NewLogEntry) -> Option<u64> {
        match self.store.insert(entry) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(action = %entry.action, error = %e, "could not record log entry");
                None
            }
        }
    }

    /// Entries matching `spec`, in its order and window.
    pub fn find(&self, spec: &FilterSpec) -> Result<Vec<LogEntry>> {
        let spec = self.apply_cap(spec.clone());
        self.store.query(&self.builder.compile(&spec))
    }

    /// Normalize raw input, then [`LogService::find`].
    pub fn find_raw(&self, raw: RawFilter) -> Result<Vec<LogEntry>> {
        self.find(&raw.normalize())
    }

    /// Total rows matching `spec`, ignoring its window.
    pub fn count(&self, spec: &FilterSpec) -> Result<u64> {
        self.store.count(&self.builder.compile_count(spec))
    }

    /// Page `page` (1-based) of `per_page` rows, with the total and page
    /// count for the whole match.
    pub fn page(&self, spec: &FilterSpec, page: u64, per_page: u64) -> Result<LogPage> {
        let page = page.max(1);
        let per_page = self.max_limit.map_or(per_page, |max| per_page.min(max));

        let total = self.count(spec)?;
        let entries = self
            .store
            .query(&self.builder.compile(&spec.clone().page(page, per_page)))?;

        Ok(LogPage {
            entries,
            total,
            page,
            per_page,
            total_pages: page::total_pages(total, per_page),
        })
    }

    /// Delete the given ids. Missing ids are skipped silently.
    pub fn delete(&self, ids: &[u64]) -> Result<u64> {
        let removed = self.store.delete_many(ids)?;
        tracing::info!(requested = ids.len(), removed, "deleted log entries");
        Ok(removed)
    }

    pub fn distinct(&self, field: DistinctField) -> Result<Vec<String>> {
        self.store.distinct_values(field)
    }

    /// Number of entries per distinct action, ordered by action.
    pub fn action_counts(&self) -> Result<Vec<(String, u64)>> {
        self.distinct(DistinctField::Action)?
            .into_iter()
            .map(|action| {
                let spec = RawFilter::new().action(action.as_str()).normalize();
                self.count(&spec).map(|n| (action, n))
            })
            .collect()
    }

    fn apply_cap(&self, spec: FilterSpec) -> FilterSpec {
        match self.max_limit {
            Some(max) => spec.capped(max),
            None => spec,
        }
    }
}
