use crate::cli::context::Context;
use crate::core::errors::{LogifyError, Result};
use crate::core::services::lifecycle_service::{LifecycleService, UpgradeOutcome};

/// Execute the `logify deactivate` command.
pub fn deactivate(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    LifecycleService::new(&store, &store).deactivate();
    ctx.out.success("Deactivation recorded; entries are kept");
    Ok(())
}

/// Execute the `logify upgrade` command.
pub fn upgrade(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    match LifecycleService::new(&store, &store).upgrade()? {
        UpgradeOutcome::UpToDate { version } => {
            ctx.out
                .success(&format!("Schema already at version {version}"));
        }
        UpgradeOutcome::Upgraded { from, to } => {
            ctx.out.success(&format!("Schema upgraded {from} → {to}"));
        }
    }
    Ok(())
}

/// Execute the `logify uninstall` command.
///
/// Refuses to run without `--yes`: every entry is lost.
pub fn uninstall(ctx: &Context, confirmed: bool) -> Result<()> {
    if !confirmed {
        return Err(LogifyError::InvalidArgument {
            detail: "uninstall drops the log tables and every entry in them. \
                     Re-run with --yes to confirm."
                .into(),
        });
    }

    let store = ctx.open_store()?;
    LifecycleService::new(&store, &store).uninstall()?;
    ctx.out
        .success(&format!("Dropped {} and its options table", store.table_name()));
    Ok(())
}
