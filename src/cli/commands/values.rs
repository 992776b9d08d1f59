use colored::Colorize;

use crate::cli::ValueField;
use crate::cli::context::Context;
use crate::core::errors::Result;

/// Execute the `logify values` command: one distinct value per line.
pub fn execute(ctx: &Context, field: ValueField) -> Result<()> {
    let store = ctx.open_store()?;
    for value in ctx.service(&store).distinct(field.into())? {
        ctx.out.data(&value);
    }
    Ok(())
}

/// Execute the `logify stats` command: entry count per action.
pub fn stats(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let counts = ctx.service(&store).action_counts()?;

    if counts.is_empty() {
        ctx.out.warning("No log entries found");
        return Ok(());
    }

    let total: u64 = counts.iter().map(|(_, n)| n).sum();
    ctx.out.header(&format!("logify stats ({total} entries)"));
    let width = counts.iter().map(|(a, _)| a.len()).max().unwrap_or(0);
    for (action, n) in &counts {
        ctx.out
            .data(&format!("  {:<width$} {}", action.cyan(), n.to_string().bold()));
    }
    Ok(())
}
