use crate::core::errors::Result;

/// Port for table lifecycle and the small name/value options table used
/// for version bookkeeping.
pub trait SchemaStore: Send + Sync {
    /// Create the log and options tables if they do not exist.
    fn create_schema(&self) -> Result<()>;

    /// Drop the log and options tables.
    fn drop_schema(&self) -> Result<()>;

    fn get_option(&self, name: &str) -> Result<Option<String>>;

    fn set_option(&self, name: &str, value: &str) -> Result<()>;

    fn delete_option(&self, name: &str) -> Result<()>;
}
