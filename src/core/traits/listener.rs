use crate::core::models::log_entry::{LogEntry, NewLogEntry};

/// Hooks around every insert.
///
/// `before_log` sees the normalized entry and may rewrite it; `after_log`
/// receives the stored row once the insert has committed. Both default to
/// doing nothing.
pub trait LogListener: Send + Sync {
    fn before_log(&self, _entry: &mut NewLogEntry) {}

    fn after_log(&self, _entry: &LogEntry) {}
}
