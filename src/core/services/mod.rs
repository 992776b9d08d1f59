pub mod lifecycle_service;
pub mod log_service;
pub mod query_builder;
pub mod retention_service;
