use std::collections::BTreeSet;

use crate::cli::context::Context;
use crate::core::errors::Result;

/// Execute the `logify delete` command.
///
/// Ids that do not exist are skipped; the count of removed rows is
/// reported. Repeated ids are deleted once.
pub fn execute(ctx: &Context, ids: &[u64]) -> Result<()> {
    let ids: Vec<u64> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();

    let store = ctx.open_store()?;
    let removed = ctx.service(&store).delete(&ids)?;

    if ctx.out.quiet {
        ctx.out.data(&removed.to_string());
        return Ok(());
    }

    ctx.out.success(&format!("Deleted {removed} entr{}", plural(removed)));
    let missing = missing_count(&ids, removed);
    if missing > 0 {
        ctx.out
            .warning(&format!("{missing} id(s) did not match any entry"));
    }
    Ok(())
}

/// Requested ids that matched nothing. `ids` must already be distinct.
fn missing_count(ids: &[u64], removed: u64) -> u64 {
    (ids.len() as u64).saturating_sub(removed)
}

pub(crate) fn plural(n: u64) -> &'static str {
    if n == 1 { "y" } else { "ies" }
}
