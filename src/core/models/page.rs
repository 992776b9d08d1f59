use serde::Serialize;

use crate::core::models::log_entry::LogEntry;

/// One page of a listing plus the numbers needed to render pagination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogPage {
    pub entries: Vec<LogEntry>,
    /// Rows matching the filter across all pages.
    pub total: u64,
    /// 1-based.
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

/// `ceil(total / per_page)`; zero when `per_page` is zero.
pub fn total_pages(total: u64, per_page: u64) -> u64 {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page)
}
