pub mod actor_directory;
pub mod clock;
pub mod listener;
pub mod log_store;
pub mod schema_store;
