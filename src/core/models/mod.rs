pub mod filter;
pub mod log_entry;
pub mod page;
pub mod query_plan;
pub mod text;
pub mod timestamp;
