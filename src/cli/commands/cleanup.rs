use crate::cli::commands::delete::plural;
use crate::cli::context::Context;
use crate::core::errors::Result;
use crate::core::services::retention_service::RetentionSweeper;

/// Execute the `logify cleanup` command.
///
/// Without `--days`, the configured retention window is used, and nothing
/// happens when `[retention] enabled = false`.
pub fn execute(ctx: &Context, days: Option<u32>) -> Result<()> {
    let retention = &ctx.config.retention;
    if days.is_none() && !retention.enabled {
        ctx.out
            .warning("Retention is disabled in the configuration; nothing deleted");
        return Ok(());
    }

    let store = ctx.open_store()?;
    let report = RetentionSweeper::new(&store)
        .with_clock(store.clock())
        .with_retention_days(days.unwrap_or(retention.days))
        .sweep()?;

    if ctx.out.quiet {
        ctx.out.data(&report.deleted.to_string());
        return Ok(());
    }

    if report.deleted == 0 {
        ctx.out.success(&format!(
            "No entries older than {} days",
            report.older_than_days
        ));
    } else {
        ctx.out.success(&format!(
            "Deleted {} entr{} older than {} days (before {})",
            report.deleted,
            plural(report.deleted),
            report.older_than_days,
            report.threshold.format("%Y-%m-%d %H:%M:%S"),
        ));
    }
    Ok(())
}
