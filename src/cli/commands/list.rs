use colored::Colorize;

use crate::cli::FilterArgs;
use crate::cli::context::Context;
use crate::core::errors::{LogifyError, Result};
use crate::core::models::log_entry::{LogEntry, Metadata};
use crate::core::traits::actor_directory::ActorDirectory;

/// Metadata longer than this is cut in the listing.
const META_PREVIEW_CHARS: usize = 50;

/// Execute the `logify list` command.
///
/// Shows one page of entries matching the filter flags, with the total
/// match count and page position in the header.
pub fn execute(
    ctx: &Context,
    filter: &FilterArgs,
    page: u64,
    per_page: Option<u64>,
    json: bool,
) -> Result<()> {
    let store = ctx.open_store()?;
    let service = ctx.service(&store);
    let spec = filter.to_raw().normalize();
    let per_page = per_page.unwrap_or(ctx.config.query.per_page);

    let page = service.page(&spec, page, per_page)?;

    if json {
        let rendered = serde_json::to_string_pretty(&page)
            .map_err(|e| LogifyError::Io(e.into()))?;
        ctx.out.data(&rendered);
        return Ok(());
    }

    if page.entries.is_empty() {
        ctx.out.header("logify list");
        ctx.out.warning("No log entries found");
        if !filter.is_empty() && !ctx.out.quiet {
            println!("  Try removing filters to see all entries.");
        }
        return Ok(());
    }

    ctx.out.header(&format!(
        "logify list ({} entries, page {}/{})",
        page.total, page.page, page.total_pages
    ));

    let actors = ctx.actors()?;
    for entry in &page.entries {
        ctx.out.data(&format_entry(entry, &actors));
    }
    Ok(())
}

/// Execute the `logify count` command.
pub fn count(ctx: &Context, filter: &FilterArgs) -> Result<()> {
    let store = ctx.open_store()?;
    let total = ctx.service(&store).count(&filter.to_raw().normalize())?;
    ctx.out.data(&total.to_string());
    Ok(())
}

/// One entry as a single row: id, date, actor, action, subject, metadata.
fn format_entry(entry: &LogEntry, actors: &dyn ActorDirectory) -> String {
    let date = entry.created_at.format("%Y-%m-%d %H:%M:%S");
    let subject = match (&entry.subject_type, &entry.subject_id) {
        (Some(kind), Some(id)) => format!("{kind} #{id}"),
        (Some(kind), None) => kind.clone(),
        (None, Some(id)) => format!("#{id}"),
        (None, None) => "—".to_string(),
    };

    format!(
        "  {:>6} {} {} {} {:<16} {} {:<24} {} {}",
        entry.id.to_string().dimmed(),
        "│".dimmed(),
        date.to_string().dimmed(),
        "│".dimmed(),
        actor_label(entry.actor_id, actors),
        "│".dimmed(),
        entry.action.cyan(),
        subject,
        meta_preview(entry.metadata.as_ref()).dimmed(),
    )
}

/// `guest` for absent actors, the directory name when known, otherwise a
/// deleted-user marker with the id.
pub fn actor_label(actor_id: Option<u64>, actors: &dyn ActorDirectory) -> String {
    match actor_id {
        None => "guest".to_string(),
        Some(id) => actors
            .display_name(id)
            .unwrap_or_else(|| format!("Deleted user #{id}")),
    }
}

fn meta_preview(metadata: Option<&Metadata>) -> String {
    match metadata {
        None => String::new(),
        Some(meta) => meta
            .preview(META_PREVIEW_CHARS)
            .unwrap_or_else(|| "Invalid JSON".to_string()),
    }
}
