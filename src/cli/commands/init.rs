use crate::cli::context::Context;
use crate::core::errors::Result;
use crate::core::services::lifecycle_service::{LifecycleService, current_version};

/// Execute the `logify init` command.
///
/// Creates the log and options tables if missing, stores the schema
/// version and records a `plugin_activated` entry.
pub fn execute(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    LifecycleService::new(&store, &store).activate()?;

    ctx.out.header("Logify: initializing log store");
    ctx.out.success(&format!("Database: {}", ctx.db_path.display()));
    ctx.out.success(&format!("Table: {}", store.table_name()));
    ctx.out.success(&format!("Schema version {}", current_version()));
    Ok(())
}
