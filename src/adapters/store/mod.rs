pub mod sqlite_log_store;
